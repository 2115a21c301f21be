//! Checkout flow state.

use cart::OrderSummary;

use crate::error::{CheckoutError, Result};
use crate::step::CheckoutStep;

/// One principal's progress through the checkout steps.
///
/// Entering the review step snapshots the order summary; that snapshot is
/// the amount charged at settlement, even if the cart changes afterwards.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CheckoutFlow {
    step: CheckoutStep,
    reviewed: Option<OrderSummary>,
}

impl CheckoutFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> CheckoutStep {
        self.step
    }

    /// The summary snapshotted when the flow entered the review step.
    pub fn reviewed(&self) -> Option<OrderSummary> {
        self.reviewed
    }

    /// Moves one step forward. `summary` is snapshotted when the move lands
    /// on the review step and ignored otherwise.
    pub fn advance(&mut self, summary: OrderSummary) -> Result<CheckoutStep> {
        match self.step {
            CheckoutStep::Shipping => {
                self.step = CheckoutStep::Payment;
            }
            CheckoutStep::Payment => {
                self.step = CheckoutStep::Review;
                self.reviewed = Some(summary);
            }
            current => return Err(CheckoutError::invalid(current, "advance")),
        }
        Ok(self.step)
    }

    /// Moves one step backward, discarding any review snapshot.
    pub fn go_back(&mut self) -> Result<CheckoutStep> {
        match self.step {
            CheckoutStep::Payment => {
                self.step = CheckoutStep::Shipping;
            }
            CheckoutStep::Review => {
                self.step = CheckoutStep::Payment;
                self.reviewed = None;
            }
            current => return Err(CheckoutError::invalid(current, "go back")),
        }
        Ok(self.step)
    }

    /// Enters the processing step. Only legal from review, and only with a
    /// snapshot to charge.
    pub fn start_processing(&mut self) -> Result<OrderSummary> {
        if !self.step.can_place_order() {
            return Err(CheckoutError::invalid(self.step, "place an order"));
        }
        let reviewed = self
            .reviewed
            .ok_or(CheckoutError::invalid(self.step, "place an order"))?;
        self.step = CheckoutStep::Processing;
        Ok(reviewed)
    }

    /// Settles the in-flight order as placed.
    pub fn settle_success(&mut self) -> Result<()> {
        if self.step != CheckoutStep::Processing {
            return Err(CheckoutError::invalid(self.step, "settle"));
        }
        self.step = CheckoutStep::Success;
        Ok(())
    }

    /// Settles the in-flight order as failed.
    pub fn settle_failure(&mut self) -> Result<()> {
        if self.step != CheckoutStep::Processing {
            return Err(CheckoutError::invalid(self.step, "settle"));
        }
        self.step = CheckoutStep::Failure;
        Ok(())
    }

    /// Returns the flow to the shipping step, clearing the snapshot. This is
    /// the only way out of a terminal step.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cart::Money;

    fn summary(total_cents: i64) -> OrderSummary {
        OrderSummary {
            subtotal: Money::from_cents(total_cents),
            shipping: Money::zero(),
            tax: Money::zero(),
            total: Money::from_cents(total_cents),
        }
    }

    #[test]
    fn advances_through_the_happy_path() {
        let mut flow = CheckoutFlow::new();
        assert_eq!(flow.step(), CheckoutStep::Shipping);

        assert_eq!(flow.advance(summary(100)).unwrap(), CheckoutStep::Payment);
        assert!(flow.reviewed().is_none());

        assert_eq!(flow.advance(summary(200)).unwrap(), CheckoutStep::Review);
        assert_eq!(flow.reviewed().unwrap().total, Money::from_cents(200));

        let reviewed = flow.start_processing().unwrap();
        assert_eq!(reviewed.total, Money::from_cents(200));
        assert_eq!(flow.step(), CheckoutStep::Processing);

        flow.settle_success().unwrap();
        assert_eq!(flow.step(), CheckoutStep::Success);
    }

    #[test]
    fn going_back_discards_the_review_snapshot() {
        let mut flow = CheckoutFlow::new();
        flow.advance(summary(100)).unwrap();
        flow.advance(summary(100)).unwrap();
        assert!(flow.reviewed().is_some());

        assert_eq!(flow.go_back().unwrap(), CheckoutStep::Payment);
        assert!(flow.reviewed().is_none());
        assert_eq!(flow.go_back().unwrap(), CheckoutStep::Shipping);
    }

    #[test]
    fn cannot_go_back_from_shipping() {
        let mut flow = CheckoutFlow::new();
        let err = flow.go_back().unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::InvalidTransition {
                current: CheckoutStep::Shipping,
                ..
            }
        ));
    }

    #[test]
    fn cannot_advance_past_review() {
        let mut flow = CheckoutFlow::new();
        flow.advance(summary(100)).unwrap();
        flow.advance(summary(100)).unwrap();

        let err = flow.advance(summary(100)).unwrap_err();
        assert!(matches!(err, CheckoutError::InvalidTransition { .. }));
    }

    #[test]
    fn placing_an_order_requires_the_review_step() {
        let mut flow = CheckoutFlow::new();
        assert!(flow.start_processing().is_err());

        flow.advance(summary(100)).unwrap();
        assert!(flow.start_processing().is_err());
    }

    #[test]
    fn terminal_steps_only_leave_via_reset() {
        let mut flow = CheckoutFlow::new();
        flow.advance(summary(100)).unwrap();
        flow.advance(summary(100)).unwrap();
        flow.start_processing().unwrap();
        flow.settle_failure().unwrap();

        assert!(flow.advance(summary(100)).is_err());
        assert!(flow.go_back().is_err());
        assert!(flow.start_processing().is_err());

        flow.reset();
        assert_eq!(flow.step(), CheckoutStep::Shipping);
        assert!(flow.reviewed().is_none());
    }

    #[test]
    fn settle_is_only_legal_while_processing() {
        let mut flow = CheckoutFlow::new();
        assert!(flow.settle_success().is_err());
        assert!(flow.settle_failure().is_err());
    }
}
