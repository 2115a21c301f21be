//! Application configuration loaded from environment variables.

use std::time::Duration;

use cart::{Money, PricingConfig};

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `3000`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
/// - `DATABASE_URL` — Postgres connection string; unset runs in-memory
/// - `SHIPPING_CENTS` — flat shipping charge in cents (default: `1000`)
/// - `TAX_RATE_BP` — tax rate in basis points (default: `500`)
/// - `SETTLEMENT_DELAY_MS` — simulated gateway delay (default: `3000`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub database_url: Option<String>,
    pub shipping_cents: i64,
    pub tax_rate_bp: u32,
    pub settlement_delay_ms: u64,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: std::env::var("RUST_LOG").unwrap_or(defaults.log_level),
            database_url: std::env::var("DATABASE_URL").ok(),
            shipping_cents: std::env::var("SHIPPING_CENTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.shipping_cents),
            tax_rate_bp: std::env::var("TAX_RATE_BP")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.tax_rate_bp),
            settlement_delay_ms: std::env::var("SETTLEMENT_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.settlement_delay_ms),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn pricing(&self) -> PricingConfig {
        PricingConfig {
            shipping_flat: Money::from_cents(self.shipping_cents),
            tax_rate_bp: self.tax_rate_bp,
        }
    }

    pub fn settlement_delay(&self) -> Duration {
        Duration::from_millis(self.settlement_delay_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            database_url: None,
            shipping_cents: 1_000,
            tax_rate_bp: 500,
            settlement_delay_ms: 3_000,
        }
    }
}
