//! Category-specific equipment specifications.
//!
//! Each equipment category carries its own strongly-typed specification and
//! feature record. Records are checked once with [`EquipmentSpec::validate`]
//! when a listing enters the system; everything downstream can rely on the
//! bounds below holding.

use serde::{Deserialize, Serialize};

use crate::error::{RentalError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EquipmentSpec {
    MobilityScooter {
        specifications: MobilityScooterSpecs,
        features: MobilityScooterFeatures,
    },
    BabyStroller {
        specifications: BabyStrollerSpecs,
        features: BabyStrollerFeatures,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SuspensionType {
    None,
    Front,
    Full,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MobilityScooterSpecs {
    /// mph
    pub max_speed: f64,
    /// miles
    pub range: f64,
    /// lbs
    pub max_weight: f64,
    pub battery_type: String,
    /// hours
    pub charging_time: f64,
    /// inches
    #[serde(default)]
    pub wheel_size: Option<f64>,
    pub foldable: bool,
    pub basket_included: bool,
    pub lighting_system: bool,
    #[serde(default)]
    pub suspension_type: Option<SuspensionType>,
}

#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MobilityScooterFeatures {
    pub adjustable_seat: bool,
    pub armrests: bool,
    pub cup_holder: bool,
    pub anti_tip_wheels: bool,
    pub key_ignition: bool,
    pub speed_control: bool,
    pub reverse_beeper: bool,
    pub weather_protection: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum WheelType {
    AirFilled,
    FoamFilled,
    Solid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgeRange {
    pub min_months: u32,
    pub max_months: u32,
}

/// All measurements in inches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StrollerDimensions {
    pub open_length: f64,
    pub open_width: f64,
    pub open_height: f64,
    pub folded_length: f64,
    pub folded_width: f64,
    pub folded_height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BabyStrollerSpecs {
    pub age_range: AgeRange,
    /// lbs
    pub weight_limit: f64,
    pub dimensions: StrollerDimensions,
    /// lbs, the stroller itself
    pub weight: f64,
    pub wheel_type: WheelType,
    #[serde(default)]
    pub wheel_size: Option<f64>,
    pub seat_count: u32,
}

#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BabyStrollerFeatures {
    pub reversible_seat: bool,
    pub adjustable_handlebar: bool,
    pub multi_position_recline: bool,
    pub five_point_harness: bool,
    pub removable_snack_tray: bool,
    pub cup_holders: u32,
    pub storage_basket: bool,
    pub sun_canopy: bool,
    pub rain_cover: bool,
    pub footmuff: bool,
    pub car_seat_compatible: bool,
    #[serde(default)]
    pub compatible_car_seats: Option<Vec<String>>,
    pub one_hand_fold: bool,
    pub standing_fold: bool,
    pub travel_system_ready: bool,
}

/// Equipment kind, used to filter search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EquipmentCategory {
    MobilityScooter,
    BabyStroller,
}

impl EquipmentCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MobilityScooter => "MOBILITY_SCOOTER",
            Self::BabyStroller => "BABY_STROLLER",
        }
    }
}

impl std::fmt::Display for EquipmentCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl EquipmentSpec {
    pub fn category(&self) -> EquipmentCategory {
        match self {
            Self::MobilityScooter { .. } => EquipmentCategory::MobilityScooter,
            Self::BabyStroller { .. } => EquipmentCategory::BabyStroller,
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            Self::MobilityScooter { specifications, .. } => specifications.validate(),
            Self::BabyStroller {
                specifications,
                features,
            } => {
                specifications.validate()?;
                check_count("cupHolders", features.cup_holders, 0, 4)
            }
        }
    }
}

impl MobilityScooterSpecs {
    fn validate(&self) -> Result<()> {
        check_range("maxSpeed", self.max_speed, 1.0, 25.0)?;
        check_range("range", self.range, 1.0, 100.0)?;
        check_range("maxWeight", self.max_weight, 100.0, 1000.0)?;
        if self.battery_type.trim().is_empty() {
            return Err(invalid("batteryType is required".into()));
        }
        check_range("chargingTime", self.charging_time, 0.5, 24.0)?;
        if let Some(wheel) = self.wheel_size {
            check_range("wheelSize", wheel, 6.0, 20.0)?;
        }
        Ok(())
    }
}

impl BabyStrollerSpecs {
    fn validate(&self) -> Result<()> {
        check_count("ageRange.minMonths", self.age_range.min_months, 0, 60)?;
        check_count("ageRange.maxMonths", self.age_range.max_months, 6, 72)?;
        if self.age_range.max_months <= self.age_range.min_months {
            return Err(invalid(
                "ageRange.maxMonths must be greater than ageRange.minMonths".into(),
            ));
        }
        check_range("weightLimit", self.weight_limit, 10.0, 150.0)?;

        let d = &self.dimensions;
        check_range("dimensions.openLength", d.open_length, 20.0, 60.0)?;
        check_range("dimensions.openWidth", d.open_width, 15.0, 40.0)?;
        check_range("dimensions.openHeight", d.open_height, 30.0, 50.0)?;
        check_range("dimensions.foldedLength", d.folded_length, 15.0, 40.0)?;
        check_range("dimensions.foldedWidth", d.folded_width, 10.0, 30.0)?;
        check_range("dimensions.foldedHeight", d.folded_height, 10.0, 30.0)?;

        check_range("weight", self.weight, 5.0, 50.0)?;
        if let Some(wheel) = self.wheel_size {
            check_range("wheelSize", wheel, 4.0, 16.0)?;
        }
        check_count("seatCount", self.seat_count, 1, 4)
    }
}

fn invalid(reason: String) -> RentalError {
    RentalError::InvalidParams { reason }
}

fn check_range(field: &str, value: f64, min: f64, max: f64) -> Result<()> {
    // NaN fails both comparisons, so test for containment rather than exclusion
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(invalid(format!(
            "{field} must be between {min} and {max}, got {value}"
        )))
    }
}

fn check_count(field: &str, value: u32, min: u32, max: u32) -> Result<()> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(invalid(format!(
            "{field} must be between {min} and {max}, got {value}"
        )))
    }
}
