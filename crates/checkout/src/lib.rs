//! Checkout layer for the storefront.
//!
//! This crate provides:
//! - The checkout step machine (Shipping → Payment → Review → Processing →
//!   Success / Failure)
//! - The PaymentGateway seam with a simulated settlement implementation
//! - CheckoutService, which drives step transitions and order placement

pub mod error;
pub mod flow;
pub mod gateway;
pub mod service;
pub mod step;

pub use error::CheckoutError;
pub use flow::CheckoutFlow;
pub use gateway::{GatewayError, PaymentGateway, PaymentResult, SimulatedGateway};
pub use service::{CheckoutService, CheckoutState, OrderReceipt};
pub use step::CheckoutStep;
