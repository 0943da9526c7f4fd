//! # Editing Session
//!
//! The estimate being edited, as an immutable value. Each user action
//! produces a new session; the previous one is left untouched, so a caller
//! can keep it for undo or compare before/after.

use tracing::debug;

use crate::model::{CatalogEntry, DiscountType, Estimate, ItemEdit, ItemType, LineItem, Quantity};

/// One user action against the estimate.
#[derive(Debug, Clone, PartialEq)]
pub enum EditAction {
    /// Add an unmeasured item seeded from a catalog section.
    AddFromCatalog(CatalogEntry),
    /// Add a blank item of the given type with no catalog price.
    AddCustom {
        category: String,
        subcategory: String,
        item_type: ItemType,
    },
    EditItem {
        id: String,
        edit: ItemEdit,
    },
    RemoveItem(String),
    SetDiscount {
        discount: f64,
        discount_type: DiscountType,
    },
    SetClient {
        name: String,
        address: String,
        phone: String,
    },
    SetDate(String),
    SetNotes(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EditSession {
    estimate: Estimate,
    next_id: usize,
}

impl EditSession {
    pub fn new(estimate: Estimate) -> Self {
        let next_id = estimate.items().len() + 1;
        Self { estimate, next_id }
    }

    pub fn estimate(&self) -> &Estimate {
        &self.estimate
    }

    pub fn into_estimate(self) -> Estimate {
        self.estimate
    }

    /// Apply an action and return the resulting session.
    pub fn apply(&self, action: EditAction) -> EditSession {
        let mut next = self.clone();
        match action {
            EditAction::AddFromCatalog(entry) => {
                let id = next.allocate_id();
                next.estimate.push_item(LineItem::from_catalog(id, &entry));
            }
            EditAction::AddCustom {
                category,
                subcategory,
                item_type,
            } => {
                let id = next.allocate_id();
                let item = LineItem::new(id, Quantity::empty(item_type), 0.0)
                    .with_category(category, subcategory)
                    .apply(ItemEdit::SetAmountPerUnit(None));
                next.estimate.push_item(item);
            }
            EditAction::EditItem { id, edit } => {
                if !next.estimate.update_item(&id, edit) {
                    debug!(id = %id, "edit for unknown item ignored");
                }
            }
            EditAction::RemoveItem(id) => {
                if next.estimate.remove_item(&id).is_none() {
                    debug!(id = %id, "remove for unknown item ignored");
                }
            }
            EditAction::SetDiscount {
                discount,
                discount_type,
            } => next.estimate.set_discount(discount, discount_type),
            EditAction::SetClient {
                name,
                address,
                phone,
            } => {
                next.estimate.client_name = name;
                next.estimate.client_address = address;
                next.estimate.client_phone = phone;
            }
            EditAction::SetDate(date) => next.estimate.date = date,
            EditAction::SetNotes(notes) => next.estimate.notes = notes,
        }
        next
    }

    /// Apply actions in order.
    pub fn apply_all<I>(&self, actions: I) -> EditSession
    where
        I: IntoIterator<Item = EditAction>,
    {
        actions
            .into_iter()
            .fold(self.clone(), |session, action| session.apply(action))
    }

    fn allocate_id(&mut self) -> String {
        loop {
            let id = format!("item-{}", self.next_id);
            self.next_id += 1;
            if self.estimate.item(&id).is_none() {
                return id;
            }
        }
    }
}

impl From<Estimate> for EditSession {
    fn from(estimate: Estimate) -> Self {
        Self::new(estimate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CatalogSection, Measurement};

    fn laminate() -> CatalogEntry {
        CatalogEntry {
            category: "Kitchen".to_string(),
            subcategory: "Shutters".to_string(),
            section: CatalogSection {
                material: "Laminate".to_string(),
                description: "1mm gloss".to_string(),
                unit_price: Some(250.0),
                item_type: ItemType::Area,
            },
        }
    }

    #[test]
    fn previous_session_is_untouched() {
        let empty = EditSession::new(Estimate::new("E-1"));
        let added = empty.apply(EditAction::AddFromCatalog(laminate()));
        assert!(empty.estimate().items().is_empty());
        assert_eq!(added.estimate().items().len(), 1);
        assert_eq!(added.estimate().items()[0].total_amount(), 0.0);
    }

    #[test]
    fn measuring_reprices_item_and_estimate() {
        let session = EditSession::new(Estimate::new("E-1")).apply_all([
            EditAction::AddFromCatalog(laminate()),
            EditAction::EditItem {
                id: "item-1".to_string(),
                edit: ItemEdit::SetLength(Some(304.8)),
            },
            EditAction::EditItem {
                id: "item-1".to_string(),
                edit: ItemEdit::SetBreadth(Some(121.92)),
            },
            EditAction::EditItem {
                id: "item-1".to_string(),
                edit: ItemEdit::AddMeasurement(Measurement::new(92.903, 100.0)),
            },
        ]);
        // 40 + 10 sq ft at 250
        let item = session.estimate().item("item-1").unwrap();
        assert_eq!(item.total_amount(), 12_500.0);
        assert_eq!(session.estimate().total_amount(), 12_500.0);
    }

    #[test]
    fn discount_and_removal() {
        let session = EditSession::new(Estimate::new("E-1")).apply_all([
            EditAction::AddCustom {
                category: "Living".to_string(),
                subcategory: "TV Unit".to_string(),
                item_type: ItemType::Pieces,
            },
            EditAction::EditItem {
                id: "item-1".to_string(),
                edit: ItemEdit::SetPieces(4),
            },
            EditAction::EditItem {
                id: "item-1".to_string(),
                edit: ItemEdit::SetAmountPerUnit(Some(500.0)),
            },
            EditAction::SetDiscount {
                discount: 200.0,
                discount_type: DiscountType::Fixed,
            },
        ]);
        assert_eq!(session.estimate().total_amount(), 1800.0);

        let removed = session.apply(EditAction::RemoveItem("item-1".to_string()));
        assert_eq!(removed.estimate().total_amount(), -200.0);
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let session = EditSession::new(Estimate::new("E-1"));
        let after = session.apply(EditAction::EditItem {
            id: "nope".to_string(),
            edit: ItemEdit::SetPieces(3),
        });
        assert_eq!(after, session);
    }

    #[test]
    fn ids_do_not_collide_with_loaded_items() {
        let mut estimate = Estimate::new("E-1");
        estimate.push_item(LineItem::new("item-2", Quantity::pieces(1), 1.0));
        let session = EditSession::from(estimate).apply_all([
            EditAction::AddFromCatalog(laminate()),
            EditAction::AddFromCatalog(laminate()),
        ]);
        let ids: Vec<&str> = session.estimate().items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["item-2", "item-3", "item-4"]);
    }

    #[test]
    fn client_details() {
        let session = EditSession::new(Estimate::new("E-1")).apply(EditAction::SetClient {
            name: "R. Mehta".to_string(),
            address: "12 Park Street".to_string(),
            phone: "98300 00000".to_string(),
        });
        assert_eq!(session.estimate().client_name, "R. Mehta");
        assert_eq!(session.estimate().client_phone, "98300 00000");
    }
}
