//! # Configuration State
//!
//! Stores application configuration loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`TILL_*`)
//! 2. Defaults (this file)
//!
//! ## Thread Safety
//! Configuration is read-only after initialization, so no mutex needed.

use chrono::Duration;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use till_core::{Money, SessionExpiryPolicy, TaxRate};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigState {
    /// Store name (printed on receipts)
    pub store_name: String,

    /// Store address lines (for receipts)
    pub store_address: Vec<String>,

    /// Currency code (ISO 4217)
    pub currency_code: String,

    /// Currency symbol (for display)
    pub currency_symbol: String,

    /// Flat sale tax rate in basis points
    /// e.g., 1800 = 18%
    pub tax_rate_bps: u32,

    /// Hours an open register session may sit before a restart forces a
    /// fresh `open_register`.
    pub max_session_age_hours: i64,

    /// SQLite database file. `None` keeps everything in memory.
    pub database_path: Option<PathBuf>,
}

impl Default for ConfigState {
    /// Returns default configuration suitable for development.
    ///
    /// ## Default Values
    /// - Store: "Till Dev Store"
    /// - Currency: TZS (TSh), whole units
    /// - Tax: 18%
    /// - Session expiry: 24 hours
    /// - Database: platform data directory
    fn default() -> Self {
        ConfigState {
            store_name: "Till Dev Store".to_string(),
            store_address: vec!["Kariakoo Market, Stall 14".to_string(), "Dar es Salaam".to_string()],
            currency_code: "TZS".to_string(),
            currency_symbol: "TSh ".to_string(),
            tax_rate_bps: 1800,
            max_session_age_hours: 24,
            database_path: default_database_path(),
        }
    }
}

impl ConfigState {
    /// Creates a new ConfigState from environment variables and defaults.
    ///
    /// ## Environment Variables
    /// - `TILL_STORE_NAME`: Override store name
    /// - `TILL_CURRENCY_SYMBOL`: Override currency symbol
    /// - `TILL_TAX_RATE`: Override tax rate as a percentage (e.g., "18")
    /// - `TILL_DB_PATH`: Override database path (`:memory:` for none)
    /// - `TILL_MAX_SESSION_AGE_HOURS`: Override session expiry
    ///
    /// Unparseable values are ignored and the default kept.
    pub fn from_env() -> Self {
        let mut config = ConfigState::default();

        if let Ok(store_name) = std::env::var("TILL_STORE_NAME") {
            config.store_name = store_name;
        }

        if let Ok(symbol) = std::env::var("TILL_CURRENCY_SYMBOL") {
            config.currency_symbol = symbol;
        }

        if let Ok(tax_rate_str) = std::env::var("TILL_TAX_RATE") {
            if let Some(bps) = parse_percent_bps(&tax_rate_str) {
                config.tax_rate_bps = bps;
            }
        }

        if let Ok(path) = std::env::var("TILL_DB_PATH") {
            config.database_path = if path == ":memory:" {
                None
            } else {
                Some(PathBuf::from(path))
            };
        }

        if let Ok(hours) = std::env::var("TILL_MAX_SESSION_AGE_HOURS") {
            if let Ok(hours) = hours.trim().parse::<i64>() {
                if hours > 0 {
                    config.max_session_age_hours = hours;
                }
            }
        }

        config
    }

    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.tax_rate_bps)
    }

    pub fn expiry_policy(&self) -> SessionExpiryPolicy {
        SessionExpiryPolicy::new(Duration::hours(self.max_session_age_hours))
    }

    /// Formats an amount with the currency symbol and thousands separators.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let config = ConfigState::default();
    /// assert_eq!(config.format_currency(Money::from_units(57_080)), "TSh 57,080");
    /// ```
    pub fn format_currency(&self, amount: Money) -> String {
        if amount.is_negative() {
            format!("-{}{}", self.currency_symbol, Money::from_units(-amount.units()))
        } else {
            format!("{}{}", self.currency_symbol, amount)
        }
    }
}

/// `"18"` → 1800, `"16.5"` → 1650. Rejects anything outside 0–100%.
fn parse_percent_bps(value: &str) -> Option<u32> {
    let rate: f64 = value.trim().parse().ok()?;
    if !(0.0..=100.0).contains(&rate) {
        return None;
    }
    Some((rate * 100.0).round() as u32)
}

/// `<platform data dir>/till.db`, or `None` if the platform has no home.
fn default_database_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "till", "till").map(|dirs| dirs.data_dir().join("till.db"))
}
