//! Payment gateway seam and simulated implementation.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use cart::Money;
use common::{OrderId, PrincipalId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("payment declined: {0}")]
    Declined(String),

    #[error("gateway unavailable: {0}")]
    Unavailable(String),
}

/// Result of a successful settlement.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentResult {
    /// The payment ID assigned by the gateway.
    pub payment_id: String,
}

/// Trait for settling payments during checkout.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Charges a principal for an order.
    async fn charge(
        &self,
        order_id: OrderId,
        principal: PrincipalId,
        amount: Money,
    ) -> Result<PaymentResult, GatewayError>;
}

#[derive(Debug, Default)]
struct SimulatedState {
    charges: Vec<(OrderId, PrincipalId, Money)>,
    next_id: u32,
    decline_next: bool,
}

/// Simulated gateway: waits a fixed settlement delay, then approves.
///
/// Tests can arm [`set_decline_next`](Self::set_decline_next) to have the
/// following charge declined instead.
#[derive(Debug, Clone)]
pub struct SimulatedGateway {
    state: Arc<RwLock<SimulatedState>>,
    delay: Duration,
}

impl Default for SimulatedGateway {
    fn default() -> Self {
        Self::with_delay(Duration::from_secs(3))
    }
}

impl SimulatedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a gateway with a custom settlement delay.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            state: Arc::new(RwLock::new(SimulatedState::default())),
            delay,
        }
    }

    /// Arms the gateway to decline the next charge.
    pub fn set_decline_next(&self, decline: bool) {
        self.state.write().unwrap().decline_next = decline;
    }

    /// Returns the number of settled charges.
    pub fn charge_count(&self) -> usize {
        self.state.read().unwrap().charges.len()
    }

    /// Returns the amount of the most recent settled charge.
    pub fn last_charged_amount(&self) -> Option<Money> {
        self.state
            .read()
            .unwrap()
            .charges
            .last()
            .map(|(_, _, amount)| *amount)
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn charge(
        &self,
        order_id: OrderId,
        principal: PrincipalId,
        amount: Money,
    ) -> Result<PaymentResult, GatewayError> {
        tokio::time::sleep(self.delay).await;

        let mut state = self.state.write().unwrap();
        if state.decline_next {
            state.decline_next = false;
            return Err(GatewayError::Declined("card declined".to_string()));
        }

        state.next_id += 1;
        let payment_id = format!("PAY-{:04}", state.next_id);
        state.charges.push((order_id, principal, amount));

        Ok(PaymentResult { payment_id })
    }
}
