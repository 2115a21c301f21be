//! Fixed-point money arithmetic.

use serde::{Deserialize, Serialize};

/// Money amount represented in cents to avoid floating point issues.
///
/// Documents written by other storefront clients carry prices in major units
/// (possibly as strings); those are rounded to the nearest cent once, at the
/// normalization boundary. All derivation after that point is exact integer
/// arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money {
    /// Amount in cents (e.g., 1000 = $10.00)
    cents: i64,
}

impl Money {
    /// Creates a new Money amount from cents.
    pub fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Creates a new Money amount from a whole dollar value.
    pub fn from_dollars(dollars: i64) -> Self {
        Self {
            cents: dollars * 100,
        }
    }

    /// Creates a Money amount from a major-unit value, rounding to the
    /// nearest cent. Negative amounts clamp to zero; prices are never
    /// negative.
    pub fn from_major_units(value: f64) -> Self {
        let cents = (value * 100.0).round() as i64;
        Self {
            cents: cents.max(0),
        }
    }

    /// Coerces a loosely typed JSON value (number or numeric string) into a
    /// Money amount. Missing or invalid values coerce to zero.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Number(n) => {
                n.as_f64().map(Self::from_major_units).unwrap_or_default()
            }
            serde_json::Value::String(s) => s
                .trim()
                .parse::<f64>()
                .map(Self::from_major_units)
                .unwrap_or_default(),
            _ => Self::zero(),
        }
    }

    /// Returns zero money.
    pub fn zero() -> Self {
        Self { cents: 0 }
    }

    /// Returns the amount in cents.
    pub fn cents(&self) -> i64 {
        self.cents
    }

    /// Returns the amount in major units as a float, for document writes.
    pub fn to_major_units(&self) -> f64 {
        self.cents as f64 / 100.0
    }

    /// Returns the dollar portion (whole number).
    pub fn dollars(&self) -> i64 {
        self.cents / 100
    }

    /// Returns the cents portion (remainder after dollars).
    pub fn cents_part(&self) -> i64 {
        self.cents.abs() % 100
    }

    /// Returns true if the amount is positive.
    pub fn is_positive(&self) -> bool {
        self.cents > 0
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.cents == 0
    }

    /// Multiplies by a quantity.
    pub fn multiply(&self, quantity: u32) -> Money {
        Money {
            cents: self.cents * quantity as i64,
        }
    }

    /// Applies a rate given in basis points, rounding half up.
    ///
    /// Used for tax derivation: 500 bp of $25.00 is exactly $1.25.
    pub fn apply_rate_bp(&self, basis_points: u32) -> Money {
        Money {
            cents: (self.cents * basis_points as i64 + 5_000) / 10_000,
        }
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.cents < 0 {
            write!(f, "-${}.{:02}", self.dollars().abs(), self.cents_part())
        } else {
            write!(f, "${}.{:02}", self.dollars(), self.cents_part())
        }
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money {
            cents: self.cents + rhs.cents,
        }
    }
}

impl std::ops::Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Self) -> Self::Output {
        Money {
            cents: self.cents - rhs.cents,
        }
    }
}

impl std::ops::AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.cents += rhs.cents;
    }
}

impl std::ops::SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.cents -= rhs.cents;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_from_cents() {
        let money = Money::from_cents(1234);
        assert_eq!(money.cents(), 1234);
        assert_eq!(money.dollars(), 12);
        assert_eq!(money.cents_part(), 34);
    }

    #[test]
    fn test_money_from_major_units_rounds_to_cent() {
        assert_eq!(Money::from_major_units(9.99).cents(), 999);
        assert_eq!(Money::from_major_units(10.0).cents(), 1000);
        assert_eq!(Money::from_major_units(0.005).cents(), 1);
        assert_eq!(Money::from_major_units(-5.0).cents(), 0);
    }

    #[test]
    fn test_money_from_json_coercion() {
        assert_eq!(Money::from_json(&serde_json::json!(9.99)).cents(), 999);
        assert_eq!(Money::from_json(&serde_json::json!(549)).cents(), 54900);
        assert_eq!(Money::from_json(&serde_json::json!("12.50")).cents(), 1250);
        assert_eq!(Money::from_json(&serde_json::json!(null)).cents(), 0);
        assert_eq!(Money::from_json(&serde_json::json!("n/a")).cents(), 0);
        assert_eq!(Money::from_json(&serde_json::json!({})).cents(), 0);
    }

    #[test]
    fn test_money_major_units_roundtrip() {
        let money = Money::from_cents(999);
        assert_eq!(Money::from_major_units(money.to_major_units()), money);
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::from_cents(1234).to_string(), "$12.34");
        assert_eq!(Money::from_cents(100).to_string(), "$1.00");
        assert_eq!(Money::from_cents(5).to_string(), "$0.05");
        assert_eq!(Money::from_cents(-1234).to_string(), "-$12.34");
    }

    #[test]
    fn test_money_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!(a.multiply(3).cents(), 3000);
    }

    #[test]
    fn test_apply_rate_bp() {
        // 5% of $25.00 is exactly $1.25
        assert_eq!(Money::from_cents(2500).apply_rate_bp(500).cents(), 125);
        // Half a cent rounds up: 5% of $0.10 = 0.5 cents -> 1 cent
        assert_eq!(Money::from_cents(10).apply_rate_bp(500).cents(), 1);
        assert_eq!(Money::zero().apply_rate_bp(500).cents(), 0);
    }

    #[test]
    fn test_money_add_assign() {
        let mut money = Money::from_cents(100);
        money += Money::from_cents(50);
        assert_eq!(money.cents(), 150);
    }

    #[test]
    fn test_money_sub_assign() {
        let mut money = Money::from_cents(100);
        money -= Money::from_cents(30);
        assert_eq!(money.cents(), 70);
    }
}
