use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::equipment::EquipmentSpec;
use crate::error::{RentalError, Result};

/// A bookable piece of equipment, as far as pricing and availability care.
///
/// Weekly and monthly rates are expected to be cheaper than the same number
/// of days at the daily rate. That is assumed, not checked: a tier that is
/// not a discount is still applied as declared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentalResource {
    pub id: String,
    pub daily_rate: Decimal,
    #[serde(default)]
    pub weekly_rate: Option<Decimal>,
    #[serde(default)]
    pub monthly_rate: Option<Decimal>,
    #[serde(default)]
    pub security_deposit: Option<Decimal>,
    #[serde(default = "default_min_rental_days")]
    pub min_rental_days: u32,
    #[serde(default)]
    pub max_rental_days: Option<u32>,
    #[serde(default)]
    pub equipment: Option<EquipmentSpec>,
}

fn default_min_rental_days() -> u32 {
    1
}

impl RentalResource {
    /// Rates only: every declared rate must be positive.
    pub fn validate_rates(&self) -> Result<()> {
        ensure_positive("daily_rate", self.daily_rate)?;
        if let Some(weekly) = self.weekly_rate {
            ensure_positive("weekly_rate", weekly)?;
        }
        if let Some(monthly) = self.monthly_rate {
            ensure_positive("monthly_rate", monthly)?;
        }
        Ok(())
    }

    /// Full ingress validation for a listing entering the system.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(RentalError::InvalidParams {
                reason: "resource id is required".into(),
            });
        }
        self.validate_rates()?;
        if let Some(deposit) = self.security_deposit
            && deposit < Decimal::ZERO
        {
            return Err(RentalError::InvalidParams {
                reason: format!("security_deposit cannot be negative, got {deposit}"),
            });
        }
        if self.min_rental_days == 0 {
            return Err(RentalError::InvalidParams {
                reason: "min_rental_days must be at least 1".into(),
            });
        }
        if let Some(max) = self.max_rental_days
            && max < self.min_rental_days
        {
            return Err(RentalError::InvalidParams {
                reason: format!(
                    "max_rental_days ({max}) cannot be less than min_rental_days ({})",
                    self.min_rental_days
                ),
            });
        }
        if let Some(ref equipment) = self.equipment {
            equipment.validate()?;
        }
        Ok(())
    }
}

fn ensure_positive(field: &'static str, value: Decimal) -> Result<()> {
    if value <= Decimal::ZERO {
        return Err(RentalError::InvalidRate { field, value });
    }
    Ok(())
}

impl std::fmt::Display for RentalResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "# Resource {}", self.id)?;
        if let Some(ref equipment) = self.equipment {
            writeln!(f, "Category: {}", equipment.category())?;
        }
        writeln!(f, "Daily rate: {}", self.daily_rate)?;
        if let Some(weekly) = self.weekly_rate {
            writeln!(f, "Weekly rate: {weekly}")?;
        }
        if let Some(monthly) = self.monthly_rate {
            writeln!(f, "Monthly rate: {monthly}")?;
        }
        if let Some(deposit) = self.security_deposit {
            writeln!(f, "Security deposit: {deposit}")?;
        }
        match self.max_rental_days {
            Some(max) => writeln!(f, "Rental length: {}-{max} days", self.min_rental_days)?,
            None => writeln!(f, "Rental length: at least {} day(s)", self.min_rental_days)?,
        }
        Ok(())
    }
}
