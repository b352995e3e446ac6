//! Terminal configuration, loaded from environment variables with fallback
//! to development defaults.

use std::env;

use tally_core::{validation, TaxRate};

/// Terminal session configuration.
///
/// Read-only after startup; no mutex needed.
#[derive(Debug, Clone)]
pub struct TerminalConfig {
    /// Store name for receipts and logs.
    pub store_name: String,

    /// Staff member operating this terminal.
    pub staff_id: String,

    /// Tax rate in basis points (1650 = 16.5%). Always configuration,
    /// never a literal anywhere in the engine.
    pub tax_rate: TaxRate,
}

impl TerminalConfig {
    /// Loads configuration from `TALLY_*` environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let tax_rate_bps: u32 = env::var("TALLY_TAX_RATE_BPS")
            .unwrap_or_else(|_| "1650".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("TALLY_TAX_RATE_BPS".to_string()))?;
        validation::validate_tax_rate_bps(tax_rate_bps)
            .map_err(|_| ConfigError::InvalidValue("TALLY_TAX_RATE_BPS".to_string()))?;

        Ok(TerminalConfig {
            store_name: env::var("TALLY_STORE_NAME")
                .unwrap_or_else(|_| "Tally Demo Store".to_string()),
            staff_id: env::var("TALLY_STAFF_ID").unwrap_or_else(|_| "staff-demo".to_string()),
            tax_rate: TaxRate::from_bps(tax_rate_bps),
        })
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
