//! Cart snapshots.

use std::collections::BTreeMap;

use common::ProductId;
use doc_store::Document;

use crate::line_item::LineItem;

/// The current principal's cart: at most one line item per product id.
///
/// A cart is a normalized snapshot of the `cart` collection; it is replaced
/// wholesale on every change notification and never mutated in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    items: BTreeMap<ProductId, LineItem>,
}

impl Cart {
    /// Builds a normalized cart from a collection snapshot.
    pub fn from_documents(docs: &[Document]) -> Self {
        let items = docs
            .iter()
            .map(LineItem::from_document)
            .map(|item| (item.product_id.clone(), item))
            .collect();
        Self { items }
    }

    /// Returns the line items, ordered by product id.
    pub fn items(&self) -> impl Iterator<Item = &LineItem> {
        self.items.values()
    }

    /// Returns a line item by product id.
    pub fn get_item(&self, product_id: &ProductId) -> Option<&LineItem> {
        self.items.get(product_id)
    }

    /// Returns the number of distinct line items.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Returns the total quantity across all line items.
    pub fn total_quantity(&self) -> u32 {
        self.items.values().map(|item| item.quantity).sum()
    }

    /// Returns true if the cart has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
