//! Checkout orchestration.

use cart::{CartError, CartService, OrderSummary, SessionProvider};
use chrono::{DateTime, Utc};
use common::OrderId;
use doc_store::DocumentStore;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::{CheckoutError, Result};
use crate::flow::CheckoutFlow;
use crate::gateway::{GatewayError, PaymentGateway};
use crate::step::CheckoutStep;

/// A point-in-time view of the checkout flow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CheckoutState {
    pub step: CheckoutStep,
    pub reviewed: Option<OrderSummary>,
}

/// Receipt for a successfully placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderReceipt {
    pub order_id: OrderId,
    pub payment_id: String,
    pub summary: OrderSummary,
    pub placed_at: DateTime<Utc>,
}

/// Drives one principal's checkout: step transitions, the review snapshot,
/// and settlement through the payment gateway.
///
/// The flow lock is held across settlement, so a second `place_order` issued
/// while one is in flight fails with an invalid-transition error instead of
/// charging twice.
#[derive(Debug)]
pub struct CheckoutService<S, P, G> {
    cart: CartService<S, P>,
    gateway: G,
    flow: Mutex<CheckoutFlow>,
}

impl<S, P, G> CheckoutService<S, P, G>
where
    S: DocumentStore,
    P: SessionProvider,
    G: PaymentGateway,
{
    pub fn new(cart: CartService<S, P>, gateway: G) -> Self {
        Self {
            cart,
            gateway,
            flow: Mutex::new(CheckoutFlow::new()),
        }
    }

    pub fn cart(&self) -> &CartService<S, P> {
        &self.cart
    }

    pub async fn state(&self) -> CheckoutState {
        let flow = self.flow.lock().await;
        CheckoutState {
            step: flow.step(),
            reviewed: flow.reviewed(),
        }
    }

    /// Moves one step forward. Entering review snapshots the current order
    /// summary as the amount to charge.
    #[tracing::instrument(skip(self))]
    pub async fn advance(&self) -> Result<CheckoutState> {
        let summary = self.cart.summary().await?;
        let mut flow = self.flow.lock().await;
        let step = flow.advance(summary)?;

        metrics::counter!("checkout_step_advances_total").increment(1);
        tracing::debug!(%step, "checkout advanced");
        Ok(CheckoutState {
            step,
            reviewed: flow.reviewed(),
        })
    }

    /// Moves one step backward, discarding any review snapshot.
    #[tracing::instrument(skip(self))]
    pub async fn go_back(&self) -> Result<CheckoutState> {
        let mut flow = self.flow.lock().await;
        let step = flow.go_back()?;
        Ok(CheckoutState {
            step,
            reviewed: flow.reviewed(),
        })
    }

    /// Places the order: charges the reviewed total, then lands on the
    /// success or failure step.
    ///
    /// The charged amount is the snapshot taken when the flow entered the
    /// review step, not whatever the cart holds now.
    #[tracing::instrument(skip(self))]
    pub async fn place_order(&self) -> Result<OrderReceipt> {
        let mut flow = self.flow.lock().await;

        if !flow.step().can_place_order() {
            return Err(CheckoutError::invalid(flow.step(), "place an order"));
        }
        let principal = self
            .cart
            .session()
            .current_principal()
            .ok_or(CartError::AuthRequired)?;
        if self.cart.load().await?.cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let reviewed = flow.start_processing()?;
        let order_id = OrderId::new();

        match self
            .gateway
            .charge(order_id, principal, reviewed.total)
            .await
        {
            Ok(payment) => {
                flow.settle_success()?;

                // The charge has settled; a failed cart clear must not cost
                // the caller the receipt.
                if let Err(err) = self.cart.clear().await {
                    tracing::warn!(%order_id, error = %err, "order placed but cart clear failed");
                }

                metrics::counter!("checkout_orders_placed_total").increment(1);
                tracing::info!(%order_id, payment_id = %payment.payment_id, "order placed");
                Ok(OrderReceipt {
                    order_id,
                    payment_id: payment.payment_id,
                    summary: reviewed,
                    placed_at: Utc::now(),
                })
            }
            Err(err) => {
                flow.settle_failure()?;

                metrics::counter!("checkout_orders_failed_total").increment(1);
                tracing::warn!(%order_id, error = %err, "settlement failed");
                Err(match err {
                    GatewayError::Declined(reason) => CheckoutError::Declined(reason),
                    other => CheckoutError::Gateway(other),
                })
            }
        }
    }

    /// Returns the flow to the shipping step. Legal from any step except
    /// while settlement is in flight (the lock is held for its duration).
    #[tracing::instrument(skip(self))]
    pub async fn reset(&self) -> CheckoutState {
        let mut flow = self.flow.lock().await;
        flow.reset();
        CheckoutState {
            step: flow.step(),
            reviewed: None,
        }
    }
}
