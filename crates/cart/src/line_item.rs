//! Line items and their document normalization.

use common::ProductId;
use doc_store::Document;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::money::Money;

/// Optional variant attributes chosen when adding a product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub color: Option<String>,
    pub size: Option<String>,
}

impl Variant {
    /// Returns true if no variant attribute is set.
    pub fn is_empty(&self) -> bool {
        self.color.is_none() && self.size.is_none()
    }
}

/// A catalog entry as seen when adding it to the cart.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub unit_price: Money,
    pub category: Option<String>,
    pub thumbnail: Option<String>,
}

impl Product {
    /// Creates a catalog entry without category or thumbnail.
    pub fn new(id: impl Into<ProductId>, title: impl Into<String>, unit_price: Money) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            unit_price,
            category: None,
            thumbnail: None,
        }
    }
}

/// One product-and-quantity entry in a cart.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub product_id: ProductId,
    pub title: String,
    pub unit_price: Money,
    /// Always at least 1; removal is only ever explicit.
    pub quantity: u32,
    pub category: Option<String>,
    pub thumbnail: Option<String>,
    pub variant: Variant,
}

impl LineItem {
    /// Creates a line item for a product being added to the cart.
    pub fn from_product(product: &Product, variant: Variant, quantity: u32) -> Self {
        Self {
            product_id: product.id.clone(),
            title: product.title.clone(),
            unit_price: product.unit_price,
            quantity: quantity.max(1),
            category: product.category.clone(),
            thumbnail: product.thumbnail.clone(),
            variant,
        }
    }

    /// Normalizes a stored document into a line item.
    ///
    /// Documents are loosely typed: quantity coerces to an integer of at
    /// least 1 (missing, zero, or garbage values become 1) and price
    /// coerces to a numeric amount (missing becomes 0). Other clients of
    /// the shared store may have written either shape.
    pub fn from_document(doc: &Document) -> Self {
        let data = &doc.data;
        Self {
            product_id: ProductId::new(doc.id.clone()),
            title: data["title"].as_str().unwrap_or_default().to_string(),
            unit_price: Money::from_json(&data["price"]),
            quantity: coerce_quantity(&data["quantity"]),
            category: data["category"].as_str().map(str::to_string),
            thumbnail: data["thumbnail"].as_str().map(str::to_string),
            variant: Variant {
                color: data["color"].as_str().map(str::to_string),
                size: data["size"].as_str().map(str::to_string),
            },
        }
    }

    /// Serializes the line item into document contents for a store write.
    pub fn to_data(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        map.insert("title".to_string(), json!(self.title));
        map.insert("price".to_string(), json!(self.unit_price.to_major_units()));
        map.insert("quantity".to_string(), json!(self.quantity));
        if let Some(category) = &self.category {
            map.insert("category".to_string(), json!(category));
        }
        if let Some(thumbnail) = &self.thumbnail {
            map.insert("thumbnail".to_string(), json!(thumbnail));
        }
        if let Some(color) = &self.variant.color {
            map.insert("color".to_string(), json!(color));
        }
        if let Some(size) = &self.variant.size {
            map.insert("size".to_string(), json!(size));
        }
        serde_json::Value::Object(map)
    }

    /// Returns the total price for this item (quantity * unit price).
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

fn coerce_quantity(value: &serde_json::Value) -> u32 {
    let quantity = match value {
        serde_json::Value::Number(n) => n.as_f64().map(|q| q.round() as i64),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok().map(|q| q.round() as i64),
        _ => None,
    };
    quantity.filter(|q| *q >= 1).map_or(1, |q| q.min(u32::MAX as i64) as u32)
}
