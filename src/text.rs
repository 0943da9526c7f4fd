//! # Text Layout
//!
//! Greedy line breaking for table cells and text blocks, using UAX#14 break
//! opportunities and the standard font width tables.

use unicode_linebreak::{linebreaks, BreakOpportunity};

use crate::font::StandardFont;

/// A line of text after line-breaking.
#[derive(Debug, Clone, PartialEq)]
pub struct BrokenLine {
    pub text: String,
    /// Width of the line without trailing whitespace.
    pub width: f64,
}

/// Break opportunities indexed by char position: entry `i` is the
/// opportunity *before* `chars[i]`. Index 0 is always `None`.
fn compute_break_opportunities(text: &str) -> Vec<Option<BreakOpportunity>> {
    let char_count = text.chars().count();
    let mut result = vec![None; char_count];

    // linebreaks() yields byte offsets of the start of the next segment.
    let mut byte_to_char = vec![0usize; text.len() + 1];
    for (char_idx, (byte_idx, _)) in text.char_indices().enumerate() {
        byte_to_char[byte_idx] = char_idx;
    }
    byte_to_char[text.len()] = char_count;

    for (byte_offset, opp) in linebreaks(text) {
        let char_idx = byte_to_char[byte_offset];
        if char_idx < char_count {
            result[char_idx] = Some(opp);
        }
    }

    result
}

fn is_newline(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

fn make_line(chars: &[char], font: StandardFont, font_size: f64) -> BrokenLine {
    let text: String = chars.iter().collect();
    let text = text.trim_end().to_string();
    let width = font.measure(&text, font_size);
    BrokenLine { text, width }
}

/// Break `text` into lines no wider than `max_width`. Explicit newlines
/// always break. A word wider than the line is split between characters.
/// Always returns at least one line.
pub fn break_into_lines(
    text: &str,
    max_width: f64,
    font: StandardFont,
    font_size: f64,
) -> Vec<BrokenLine> {
    let chars: Vec<char> = text.chars().collect();
    let widths: Vec<f64> = chars
        .iter()
        .map(|&ch| {
            if is_newline(ch) {
                0.0
            } else {
                font.metrics().char_width(ch, font_size)
            }
        })
        .collect();
    let break_opps = compute_break_opportunities(text);

    let mut lines = Vec::new();
    let mut line_start = 0;
    let mut line_width = 0.0;
    let mut last_break_point: Option<usize> = None;

    for (i, &ch) in chars.iter().enumerate() {
        if i > 0 {
            match break_opps[i] {
                Some(BreakOpportunity::Mandatory) => {
                    lines.push(make_line(&chars[line_start..i], font, font_size));
                    line_start = i;
                    line_width = 0.0;
                    last_break_point = None;
                }
                // A break before chars[i]: the line may end just before i.
                Some(BreakOpportunity::Allowed) => last_break_point = Some(i),
                None => {}
            }
        }

        if is_newline(ch) {
            continue;
        }

        let char_width = widths[i];
        if line_width + char_width > max_width && line_start < i {
            if let Some(bp) = last_break_point.filter(|&bp| bp > line_start) {
                lines.push(make_line(&chars[line_start..bp], font, font_size));
                line_start = bp;
                line_width = widths[line_start..=i].iter().sum();
                last_break_point = None;
                continue;
            }

            // No break point on this line, split the word.
            lines.push(make_line(&chars[line_start..i], font, font_size));
            line_start = i;
            line_width = char_width;
            last_break_point = None;
            continue;
        }

        line_width += char_width;
    }

    if line_start < chars.len() || lines.is_empty() {
        lines.push(make_line(&chars[line_start..], font, font_size));
    }

    lines
}
