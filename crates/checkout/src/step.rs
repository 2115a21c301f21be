//! Checkout step machine.

use serde::{Deserialize, Serialize};

/// The step a checkout flow is currently on.
///
/// Step transitions:
/// ```text
/// Shipping ◄──► Payment ◄──► Review ──► Processing ──┬──► Success
///                                                    └──► Failure
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep {
    /// Collecting the shipping address.
    #[default]
    Shipping,

    /// Collecting payment details.
    Payment,

    /// Reviewing the order before placing it.
    Review,

    /// Settlement is in flight with the payment gateway.
    Processing,

    /// The order was placed (terminal state).
    Success,

    /// Settlement was declined or failed (terminal state).
    Failure,
}

impl CheckoutStep {
    /// Returns true if the flow can advance one step forward from here.
    pub fn can_advance(&self) -> bool {
        matches!(self, CheckoutStep::Shipping | CheckoutStep::Payment)
    }

    /// Returns true if the flow can step backwards from here.
    pub fn can_go_back(&self) -> bool {
        matches!(self, CheckoutStep::Payment | CheckoutStep::Review)
    }

    /// Returns true if an order can be placed from here.
    pub fn can_place_order(&self) -> bool {
        matches!(self, CheckoutStep::Review)
    }

    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, CheckoutStep::Success | CheckoutStep::Failure)
    }

    /// Returns the step name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutStep::Shipping => "shipping",
            CheckoutStep::Payment => "payment",
            CheckoutStep::Review => "review",
            CheckoutStep::Processing => "processing",
            CheckoutStep::Success => "success",
            CheckoutStep::Failure => "failure",
        }
    }
}

impl std::fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
