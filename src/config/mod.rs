pub mod types;

use std::path::Path;

use rust_decimal::Decimal;

use crate::error::{RentalError, Result};
use types::Config;

pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        tracing::info!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        RentalError::Config(format!(
            "failed to read config file {}: {e}",
            path.display()
        ))
    })?;
    if content.trim().is_empty() {
        return Ok(Config::default());
    }
    let config: Config = serde_yml::from_str(&content)?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    let pricing = &config.pricing;
    if pricing.service_fee_rate < Decimal::ZERO || pricing.tax_rate < Decimal::ZERO {
        return Err(RentalError::Config(
            "pricing rates cannot be negative".into(),
        ));
    }
    if pricing.rounding_scale > 6 {
        return Err(RentalError::Config(format!(
            "pricing.rounding_scale must be at most 6, got {}",
            pricing.rounding_scale
        )));
    }
    Ok(())
}
