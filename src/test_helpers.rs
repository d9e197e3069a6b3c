use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::domain::booking::{BlackoutInterval, BookingInterval, BookingRecord, BookingStatus};
use crate::domain::date_range::DateRange;
use crate::domain::equipment::{
    AgeRange, BabyStrollerFeatures, BabyStrollerSpecs, EquipmentSpec, MobilityScooterFeatures,
    MobilityScooterSpecs, StrollerDimensions, SuspensionType, WheelType,
};
use crate::domain::resource::RentalResource;

// --- Factory functions ---

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
}

pub fn range(start: (i32, u32, u32), end: (i32, u32, u32)) -> DateRange {
    DateRange::new(date(start.0, start.1, start.2), date(end.0, end.1, end.2))
        .expect("valid test range")
}

pub fn booking(
    start: (i32, u32, u32),
    end: (i32, u32, u32),
    status: BookingStatus,
) -> BookingInterval {
    BookingInterval {
        range: range(start, end),
        status,
    }
}

pub fn blackout(
    start: (i32, u32, u32),
    end: (i32, u32, u32),
    reason: Option<&str>,
) -> BlackoutInterval {
    BlackoutInterval {
        range: range(start, end),
        reason: reason.map(str::to_string),
    }
}

pub fn make_resource(id: &str, daily_rate: Decimal) -> RentalResource {
    RentalResource {
        id: id.to_string(),
        daily_rate,
        weekly_rate: None,
        monthly_rate: None,
        security_deposit: None,
        min_rental_days: 1,
        max_rental_days: None,
        equipment: None,
    }
}

pub fn make_booking_record(
    id: &str,
    resource_id: &str,
    start: (i32, u32, u32),
    end: (i32, u32, u32),
) -> BookingRecord {
    BookingRecord {
        id: id.to_string(),
        resource_id: resource_id.to_string(),
        renter_id: "renter-1".to_string(),
        range: range(start, end),
        status: BookingStatus::Confirmed,
        total_amount: dec!(100),
        created_at: Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap(),
    }
}

pub fn make_scooter_spec() -> EquipmentSpec {
    EquipmentSpec::MobilityScooter {
        specifications: MobilityScooterSpecs {
            max_speed: 5.0,
            range: 18.0,
            max_weight: 350.0,
            battery_type: "Lithium-ion".into(),
            charging_time: 6.0,
            wheel_size: Some(9.0),
            foldable: true,
            basket_included: true,
            lighting_system: true,
            suspension_type: Some(SuspensionType::Full),
        },
        features: MobilityScooterFeatures {
            adjustable_seat: true,
            armrests: true,
            cup_holder: false,
            anti_tip_wheels: true,
            key_ignition: true,
            speed_control: true,
            reverse_beeper: false,
            weather_protection: false,
        },
    }
}

pub fn make_stroller_spec() -> EquipmentSpec {
    EquipmentSpec::BabyStroller {
        specifications: BabyStrollerSpecs {
            age_range: AgeRange {
                min_months: 0,
                max_months: 48,
            },
            weight_limit: 50.0,
            dimensions: StrollerDimensions {
                open_length: 35.0,
                open_width: 24.0,
                open_height: 42.0,
                folded_length: 30.0,
                folded_width: 20.0,
                folded_height: 12.0,
            },
            weight: 22.0,
            wheel_type: WheelType::FoamFilled,
            wheel_size: None,
            seat_count: 1,
        },
        features: BabyStrollerFeatures {
            reversible_seat: true,
            adjustable_handlebar: true,
            multi_position_recline: true,
            five_point_harness: true,
            removable_snack_tray: false,
            cup_holders: 1,
            storage_basket: true,
            sun_canopy: true,
            rain_cover: false,
            footmuff: false,
            car_seat_compatible: true,
            compatible_car_seats: Some(vec!["Chicco KeyFit".into()]),
            one_hand_fold: true,
            standing_fold: false,
            travel_system_ready: true,
        },
    }
}
