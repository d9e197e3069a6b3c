//! Rental price calculation.
//!
//! Tier selection is greedy: the largest declared tier the rental is long
//! enough for consumes as many whole units as fit, and the remainder is
//! charged at the daily rate. Weekly and monthly tiers are never mixed, so
//! a combination that would be cheaper for the renter is not searched for.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::date_range::DateRange;
use super::resource::RentalResource;
use crate::error::{RentalError, Result};

pub const DAYS_PER_WEEK: i64 = 7;
pub const DAYS_PER_MONTH: i64 = 30;

/// Fee and rounding parameters applied on top of the rental subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingPolicy {
    pub service_fee_rate: Decimal,
    pub tax_rate: Decimal,
    /// Decimal places kept when rounding fees. 0 rounds to whole units.
    pub rounding_scale: u32,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            service_fee_rate: dec!(0.10),
            tax_rate: dec!(0.08),
            rounding_scale: 0,
        }
    }
}

impl PricingPolicy {
    /// Round half-up to `rounding_scale` places.
    pub fn round(&self, amount: Decimal) -> Decimal {
        amount.round_dp_with_strategy(self.rounding_scale, RoundingStrategy::MidpointAwayFromZero)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateTier {
    Daily,
    Weekly,
    Monthly,
}

impl RateTier {
    pub fn days_per_unit(self) -> i64 {
        match self {
            Self::Daily => 1,
            Self::Weekly => DAYS_PER_WEEK,
            Self::Monthly => DAYS_PER_MONTH,
        }
    }
}

impl std::fmt::Display for RateTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Daily => f.write_str("daily"),
            Self::Weekly => f.write_str("weekly"),
            Self::Monthly => f.write_str("monthly"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdownLine {
    pub label: String,
    pub amount: Decimal,
}

/// Result of pricing one rental.
///
/// `total_amount` is exactly `subtotal + service_fee + tax`. The security
/// deposit is reported alongside but never added in: it is authorized, not
/// charged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub days: i64,
    pub tier: RateTier,
    /// Whole tier units charged at the tier rate (0 for the daily tier).
    pub tier_units: i64,
    /// Days left over after the tier units, charged at the daily rate.
    pub remaining_days: i64,
    pub daily_rate: Decimal,
    pub subtotal: Decimal,
    pub service_fee: Decimal,
    pub tax: Decimal,
    pub security_deposit: Option<Decimal>,
    pub total_amount: Decimal,
    pub breakdown: Vec<PriceBreakdownLine>,
}

pub fn calculate_price(resource: &RentalResource, requested: &DateRange) -> Result<PriceQuote> {
    calculate_price_with(&PricingPolicy::default(), resource, requested)
}

pub fn calculate_price_with(
    policy: &PricingPolicy,
    resource: &RentalResource,
    requested: &DateRange,
) -> Result<PriceQuote> {
    resource.validate_rates()?;
    requested.validate()?;

    let days = requested.days();
    let (tier, tier_units, remaining_days, subtotal) = tiered_subtotal(resource, days)?;

    let service_fee = policy.round(mul(subtotal, policy.service_fee_rate, "service fee")?);
    let taxable = add(subtotal, service_fee, "taxable amount")?;
    let tax = policy.round(mul(taxable, policy.tax_rate, "tax")?);
    let total_amount = add(taxable, tax, "total")?;

    let breakdown = vec![
        PriceBreakdownLine {
            label: rental_label(days),
            amount: subtotal,
        },
        PriceBreakdownLine {
            label: "Service fee".into(),
            amount: service_fee,
        },
        PriceBreakdownLine {
            label: "Tax".into(),
            amount: tax,
        },
    ];

    Ok(PriceQuote {
        days,
        tier,
        tier_units,
        remaining_days,
        daily_rate: resource.daily_rate,
        subtotal,
        service_fee,
        tax,
        security_deposit: resource.security_deposit,
        total_amount,
        breakdown,
    })
}

fn rental_label(days: i64) -> String {
    if days == 1 {
        "1 day rental".to_string()
    } else {
        format!("{days} days rental")
    }
}

fn mul(a: Decimal, b: Decimal, what: &'static str) -> Result<Decimal> {
    a.checked_mul(b).ok_or(RentalError::AmountOverflow { what })
}

fn add(a: Decimal, b: Decimal, what: &'static str) -> Result<Decimal> {
    a.checked_add(b).ok_or(RentalError::AmountOverflow { what })
}

/// Returns `(tier, units, remaining_days, subtotal)`.
fn tiered_subtotal(resource: &RentalResource, days: i64) -> Result<(RateTier, i64, i64, Decimal)> {
    let tier_rate = match (resource.monthly_rate, resource.weekly_rate) {
        (Some(monthly), _) if days >= DAYS_PER_MONTH => Some((RateTier::Monthly, monthly)),
        (_, Some(weekly)) if days >= DAYS_PER_WEEK => Some((RateTier::Weekly, weekly)),
        _ => None,
    };

    match tier_rate {
        Some((tier, rate)) => {
            let per_unit = tier.days_per_unit();
            let units = days / per_unit;
            let remaining = days % per_unit;
            let subtotal = add(
                mul(Decimal::from(units), rate, "subtotal")?,
                mul(Decimal::from(remaining), resource.daily_rate, "subtotal")?,
                "subtotal",
            )?;
            Ok((tier, units, remaining, subtotal))
        }
        None => Ok((
            RateTier::Daily,
            0,
            days,
            mul(Decimal::from(days), resource.daily_rate, "subtotal")?,
        )),
    }
}

impl std::fmt::Display for PriceQuote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "# Price quote: {} day(s)", self.days)?;
        match self.tier {
            RateTier::Daily => writeln!(f, "Rate: {} x {}/day", self.days, self.daily_rate)?,
            tier => writeln!(
                f,
                "Rate: {} {tier} unit(s) + {} day(s) at {}/day",
                self.tier_units, self.remaining_days, self.daily_rate
            )?,
        }
        writeln!(f, "{}", "-".repeat(36))?;
        for line in &self.breakdown {
            writeln!(f, "{:<24} {:>11}", line.label, line.amount)?;
        }
        writeln!(f, "{}", "-".repeat(36))?;
        writeln!(f, "{:<24} {:>11}", "Total", self.total_amount)?;
        if let Some(deposit) = self.security_deposit {
            writeln!(f, "Security deposit (refundable, not included): {deposit}")?;
        }
        Ok(())
    }
}
