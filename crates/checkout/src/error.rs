use cart::CartError;
use thiserror::Error;

use crate::gateway::GatewayError;
use crate::step::CheckoutStep;

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("cannot place an order for an empty cart")]
    EmptyCart,

    #[error("cannot {action} from the {current} step")]
    InvalidTransition {
        current: CheckoutStep,
        action: &'static str,
    },

    #[error("payment was declined: {0}")]
    Declined(String),

    #[error("payment gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Cart(#[from] CartError),
}

impl CheckoutError {
    pub(crate) fn invalid(current: CheckoutStep, action: &'static str) -> Self {
        Self::InvalidTransition { current, action }
    }
}

pub type Result<T> = std::result::Result<T, CheckoutError>;
