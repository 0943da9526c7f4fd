//! # Estimo CLI
//!
//! Usage:
//!   estimo estimate.json -o estimate.pdf
//!   estimo estimate.json -o invoice.pdf --kind invoice --paid 5000
//!   estimo estimate.json --config studio.json
//!   echo '{ ... }' | estimo -o estimate.pdf
//!   estimo --example > estimate.json
//!
//! Set `RUST_LOG=debug` to see page-break decisions.

use std::env;
use std::fs;
use std::io::{self, Read};
use std::process;

use estimo::{DocumentConfig, DocumentKind, Estimate, EstimateError, RenderOptions};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

struct Args {
    input: Option<String>,
    output: String,
    config: Option<String>,
    options: RenderOptions,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let raw: Vec<String> = env::args().skip(1).collect();

    if raw.iter().any(|a| a == "--example") {
        print!("{}", example_estimate_json());
        return;
    }

    let args = match parse_args(&raw) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("error: {}", message);
            eprintln!("usage: estimo [estimate.json] [-o out.pdf] [--config cfg.json] [--kind estimate|invoice|receipt] [--paid amount]");
            process::exit(2);
        }
    };

    match run(&args) {
        Ok(len) => eprintln!("✓ Written {} bytes to {}", len, args.output),
        Err(e) => {
            error!(error = %e, "render failed");
            eprintln!("✗ failed to generate document");
            process::exit(1);
        }
    }
}

fn parse_args(raw: &[String]) -> Result<Args, String> {
    let mut args = Args {
        input: None,
        output: "estimate.pdf".to_string(),
        config: None,
        options: RenderOptions::default(),
    };

    let mut iter = raw.iter();
    while let Some(arg) = iter.next() {
        let mut value = |flag: &str| {
            iter.next()
                .cloned()
                .ok_or_else(|| format!("{} needs a value", flag))
        };
        let flag = arg.as_str();
        match flag {
            "-o" | "--output" => args.output = value(flag)?,
            "--config" => args.config = Some(value(flag)?),
            "--kind" => {
                args.options.kind = value(flag)?
                    .parse()
                    .map_err(|e: EstimateError| e.to_string())?;
            }
            "--paid" => {
                let amount = value(flag)?;
                let paid: f64 = amount
                    .parse()
                    .map_err(|_| format!("'{}' is not an amount", amount))?;
                args.options.amount_paid = Some(paid);
            }
            other if other.starts_with('-') => return Err(format!("unknown flag '{}'", other)),
            path => args.input = Some(path.to_string()),
        }
    }

    if args.options.amount_paid.is_some() && args.options.kind == DocumentKind::Estimate {
        info!("--paid is only printed on invoices and receipts");
    }
    Ok(args)
}

fn run(args: &Args) -> Result<usize, EstimateError> {
    let input = match &args.input {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let config = match &args.config {
        Some(path) => DocumentConfig::load(path)?,
        None => DocumentConfig::default(),
    };

    let estimate = Estimate::from_json(&input)?;
    let pdf_bytes = estimo::render_estimate(&estimate, &config, args.options)?;
    fs::write(&args.output, &pdf_bytes)?;
    Ok(pdf_bytes.len())
}

fn example_estimate_json() -> &'static str {
    r##"{
  "id": "EST-2026-014",
  "clientName": "Ananya Rao",
  "clientAddress": "Flat 4B, Lake View Apartments, Pune",
  "clientPhone": "+91 98220 12345",
  "date": "14 Feb 2026",
  "notes": "Hardware by Hettich. Colours to be confirmed before production.",
  "discount": 5,
  "discountType": "percentage",
  "items": [
    {
      "id": "1",
      "categoryName": "Kitchen",
      "subcategoryName": "Shutters",
      "materialName": "Acrylic",
      "description": "High gloss, 1mm edge band",
      "type": "area",
      "amountPerUnit": 650,
      "length": 240,
      "breadth": 75,
      "measurements": [{ "length": 90, "breadth": 75 }]
    },
    {
      "id": "2",
      "categoryName": "Kitchen",
      "subcategoryName": "Hardware",
      "materialName": "Tandem box",
      "description": "Soft close drawer system",
      "type": "pieces",
      "amountPerUnit": 4200,
      "pieces": 4
    },
    {
      "id": "3",
      "categoryName": "Living Room",
      "subcategoryName": "TV Unit",
      "materialName": "Profile light",
      "description": "Warm white LED in aluminium channel",
      "type": "running",
      "amountPerUnit": 180,
      "runningLength": 300,
      "runningMeasurements": [{ "length": 120 }]
    }
  ]
}
"##
}
