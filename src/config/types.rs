use std::path::PathBuf;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::domain::availability::BlockingPolicy;
use crate::domain::pricing::PricingPolicy;

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub pricing: PricingConfig,
    #[serde(default)]
    pub availability: AvailabilityConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PricingConfig {
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_service_fee_rate")]
    pub service_fee_rate: Decimal,
    #[serde(default = "default_tax_rate")]
    pub tax_rate: Decimal,
    #[serde(default)]
    pub rounding_scale: u32,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            service_fee_rate: default_service_fee_rate(),
            tax_rate: default_tax_rate(),
            rounding_scale: 0,
        }
    }
}

impl PricingConfig {
    pub fn policy(&self) -> PricingPolicy {
        PricingPolicy {
            service_fee_rate: self.service_fee_rate,
            tax_rate: self.tax_rate,
            rounding_scale: self.rounding_scale,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct AvailabilityConfig {
    /// Treat PENDING bookings (holds) as occupying the resource.
    #[serde(default)]
    pub pending_holds_block: bool,
}

impl AvailabilityConfig {
    pub fn policy(&self) -> BlockingPolicy {
        BlockingPolicy {
            pending_holds_block: self.pending_holds_block,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct StoreConfig {
    #[serde(default)]
    pub seed_path: Option<PathBuf>,
}

fn default_currency() -> String {
    "USD".into()
}

fn default_service_fee_rate() -> Decimal {
    dec!(0.10)
}

fn default_tax_rate() -> Decimal {
    dec!(0.08)
}
