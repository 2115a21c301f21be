//! Order summary derivation.

use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::money::Money;

/// Pricing knobs for summary computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingConfig {
    /// Flat shipping charge applied whenever the cart is non-empty.
    pub shipping_flat: Money,
    /// Tax rate in basis points, applied to the subtotal.
    pub tax_rate_bp: u32,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            shipping_flat: Money::from_cents(1_000),
            tax_rate_bp: 500,
        }
    }
}

/// Derived totals for a cart snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub subtotal: Money,
    pub shipping: Money,
    pub tax: Money,
    pub total: Money,
}

impl OrderSummary {
    /// Computes totals for a cart. Shipping is keyed on the subtotal, not on
    /// item count: a zero subtotal (empty cart, or only zero-priced items)
    /// yields all zeros.
    pub fn compute(cart: &Cart, pricing: &PricingConfig) -> Self {
        let subtotal = cart
            .items()
            .map(|item| item.line_total())
            .fold(Money::zero(), |acc, line| acc + line);
        let shipping = if subtotal.is_positive() {
            pricing.shipping_flat
        } else {
            Money::zero()
        };
        let tax = subtotal.apply_rate_bp(pricing.tax_rate_bp);
        let total = subtotal + shipping + tax;

        Self {
            subtotal,
            shipping,
            tax,
            total,
        }
    }

    /// An all-zero summary.
    pub fn zero() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doc_store::Document;
    use serde_json::json;

    fn cart_of(docs: Vec<Document>) -> Cart {
        Cart::from_documents(&docs)
    }

    #[test]
    fn computes_totals_for_populated_cart() {
        let cart = cart_of(vec![
            Document::new("a", json!({"price": 10, "quantity": 2})),
            Document::new("b", json!({"price": 5, "quantity": 1})),
        ]);

        let summary = OrderSummary::compute(&cart, &PricingConfig::default());
        assert_eq!(summary.subtotal.cents(), 2_500);
        assert_eq!(summary.shipping.cents(), 1_000);
        assert_eq!(summary.tax.cents(), 125);
        assert_eq!(summary.total.cents(), 3_625);
    }

    #[test]
    fn empty_cart_is_all_zeros() {
        let summary = OrderSummary::compute(&Cart::default(), &PricingConfig::default());
        assert_eq!(summary, OrderSummary::zero());
        assert_eq!(summary.total.cents(), 0);
    }

    #[test]
    fn zero_priced_items_incur_no_shipping() {
        // A document without a price normalizes to a zero unit price; the
        // cart is non-empty but there is nothing to charge shipping on.
        let cart = cart_of(vec![Document::new("a", json!({"title": "Freebie"}))]);

        let summary = OrderSummary::compute(&cart, &PricingConfig::default());
        assert_eq!(summary.subtotal.cents(), 0);
        assert_eq!(summary.shipping.cents(), 0);
        assert_eq!(summary.tax.cents(), 0);
        assert_eq!(summary.total.cents(), 0);
    }

    #[test]
    fn tax_rounds_half_up_on_odd_subtotals() {
        // 1¢ item at 5% tax: 0.05¢ rounds down to 0.
        let cart = cart_of(vec![Document::new(
            "a",
            json!({"price": 0.01, "quantity": 1}),
        )]);
        let summary = OrderSummary::compute(&cart, &PricingConfig::default());
        assert_eq!(summary.tax.cents(), 0);

        // 10¢ item: 0.5¢ rounds up to 1.
        let cart = cart_of(vec![Document::new(
            "a",
            json!({"price": 0.10, "quantity": 1}),
        )]);
        let summary = OrderSummary::compute(&cart, &PricingConfig::default());
        assert_eq!(summary.tax.cents(), 1);
    }

    #[test]
    fn custom_pricing_applies() {
        let cart = cart_of(vec![Document::new(
            "a",
            json!({"price": 100, "quantity": 1}),
        )]);
        let pricing = PricingConfig {
            shipping_flat: Money::from_cents(0),
            tax_rate_bp: 1_000,
        };

        let summary = OrderSummary::compute(&cart, &pricing);
        assert_eq!(summary.subtotal.cents(), 10_000);
        assert_eq!(summary.shipping.cents(), 0);
        assert_eq!(summary.tax.cents(), 1_000);
        assert_eq!(summary.total.cents(), 11_000);
    }
}
