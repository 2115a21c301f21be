//! Cart layer for the storefront.
//!
//! This crate provides:
//! - Money and line item value types with document normalization
//! - Cart snapshots rebuilt from the document store on every change
//! - OrderSummary derivation (subtotal, shipping, tax, total)
//! - SessionProvider abstraction over the external auth service
//! - CartService, the cart half of the cart/checkout engine

pub mod cart;
pub mod error;
pub mod line_item;
pub mod money;
pub mod service;
pub mod session;
pub mod summary;

pub use cart::Cart;
pub use error::CartError;
pub use line_item::{LineItem, Product, Variant};
pub use money::Money;
pub use service::{CART_COLLECTION, CartService, CartState, CartWatch};
pub use session::{SessionProvider, SharedSession, StaticSession};
pub use summary::{OrderSummary, PricingConfig};
