//! Shared identifier types used across the cart/checkout crates.

pub mod types;

pub use types::{OrderId, PrincipalId, ProductId};
