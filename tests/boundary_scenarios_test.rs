//! Worked pricing and availability cases, end to end through the public API.

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use scoovio_engine::domain::availability::{BlockingPolicy, is_available, is_available_with};
use scoovio_engine::domain::booking::{BlackoutInterval, BookingInterval, BookingStatus};
use scoovio_engine::domain::date_range::DateRange;
use scoovio_engine::domain::pricing::{PricingPolicy, RateTier, calculate_price, calculate_price_with};
use scoovio_engine::domain::resource::RentalResource;
use scoovio_engine::error::RentalError;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn range(start: NaiveDate, end: NaiveDate) -> DateRange {
    DateRange::new(start, end).unwrap()
}

fn resource(
    daily: Decimal,
    weekly: Option<Decimal>,
    monthly: Option<Decimal>,
) -> RentalResource {
    RentalResource {
        id: "scooter-1".into(),
        daily_rate: daily,
        weekly_rate: weekly,
        monthly_rate: monthly,
        security_deposit: None,
        min_rental_days: 1,
        max_rental_days: None,
        equipment: None,
    }
}

fn confirmed_jan_10_to_15() -> Vec<BookingInterval> {
    vec![BookingInterval {
        range: range(date(2025, 1, 10), date(2025, 1, 15)),
        status: BookingStatus::Confirmed,
    }]
}

// ---------------------------------------------------------------------------
// Pricing
// ---------------------------------------------------------------------------

#[test]
fn three_day_daily_rental() {
    let quote = calculate_price(
        &resource(dec!(45), None, None),
        &range(date(2025, 1, 1), date(2025, 1, 4)),
    )
    .unwrap();
    assert_eq!(quote.days, 3);
    assert_eq!(quote.tier, RateTier::Daily);
    assert_eq!(quote.subtotal, dec!(135));
    assert_eq!(quote.service_fee, dec!(14));
    assert_eq!(quote.tax, dec!(12));
    assert_eq!(quote.total_amount, dec!(161));
}

#[test]
fn ten_days_with_weekly_rate() {
    let quote = calculate_price(
        &resource(dec!(45), Some(dec!(270)), None),
        &range(date(2025, 1, 1), date(2025, 1, 11)),
    )
    .unwrap();
    assert_eq!(quote.tier, RateTier::Weekly);
    assert_eq!(quote.tier_units, 1);
    assert_eq!(quote.remaining_days, 3);
    assert_eq!(quote.subtotal, dec!(405));
}

#[test]
fn thirty_five_days_with_monthly_rate() {
    let quote = calculate_price(
        &resource(dec!(10), None, Some(dec!(250))),
        &range(date(2025, 1, 1), date(2025, 2, 5)),
    )
    .unwrap();
    assert_eq!(quote.days, 35);
    assert_eq!(quote.tier, RateTier::Monthly);
    assert_eq!(quote.tier_units, 1);
    assert_eq!(quote.remaining_days, 5);
    assert_eq!(quote.subtotal, dec!(300));
}

#[test]
fn monthly_tier_wins_and_weekly_is_never_mixed_in() {
    // 44 days = 1 month + 14 days; the 14 days are charged daily even though
    // two weeks would be cheaper.
    let quote = calculate_price(
        &resource(dec!(10), Some(dec!(50)), Some(dec!(250))),
        &range(date(2025, 1, 1), date(2025, 2, 14)),
    )
    .unwrap();
    assert_eq!(quote.tier, RateTier::Monthly);
    assert_eq!(quote.remaining_days, 14);
    assert_eq!(quote.subtotal, dec!(390));
}

#[test]
fn short_rental_ignores_weekly_rate() {
    let quote = calculate_price(
        &resource(dec!(45), Some(dec!(200)), None),
        &range(date(2025, 1, 1), date(2025, 1, 7)),
    )
    .unwrap();
    assert_eq!(quote.tier, RateTier::Daily);
    assert_eq!(quote.subtotal, dec!(270));
}

#[test]
fn cent_rounding_policy() {
    let policy = PricingPolicy {
        rounding_scale: 2,
        ..PricingPolicy::default()
    };
    let quote = calculate_price_with(
        &policy,
        &resource(dec!(19.99), None, None),
        &range(date(2025, 1, 1), date(2025, 1, 4)),
    )
    .unwrap();
    assert_eq!(quote.subtotal, dec!(59.97));
    assert_eq!(quote.service_fee, dec!(6.00));
    assert_eq!(quote.tax, dec!(5.28));
    assert_eq!(quote.total_amount, dec!(71.25));
}

#[test]
fn deposit_reported_but_not_charged() {
    let mut r = resource(dec!(45), None, None);
    r.security_deposit = Some(dec!(100));
    let quote = calculate_price(&r, &range(date(2025, 1, 1), date(2025, 1, 4))).unwrap();
    assert_eq!(quote.security_deposit, Some(dec!(100)));
    assert_eq!(quote.total_amount, dec!(161));
}

// ---------------------------------------------------------------------------
// Availability
// ---------------------------------------------------------------------------

#[test]
fn adjacent_range_is_available() {
    let available = is_available(
        &resource(dec!(45), None, None),
        &range(date(2025, 1, 15), date(2025, 1, 18)),
        &confirmed_jan_10_to_15(),
        &[],
    )
    .unwrap();
    assert!(available);
}

#[test]
fn overlapping_range_is_unavailable() {
    let available = is_available(
        &resource(dec!(45), None, None),
        &range(date(2025, 1, 12), date(2025, 1, 16)),
        &confirmed_jan_10_to_15(),
        &[],
    )
    .unwrap();
    assert!(!available);
}

#[test]
fn blackout_blocks_without_bookings() {
    let blackouts = vec![BlackoutInterval {
        range: range(date(2025, 2, 1), date(2025, 2, 5)),
        reason: Some("maintenance".into()),
    }];
    let available = is_available(
        &resource(dec!(45), None, None),
        &range(date(2025, 2, 3), date(2025, 2, 4)),
        &[],
        &blackouts,
    )
    .unwrap();
    assert!(!available);
}

#[test]
fn pending_hold_blocks_only_when_configured() {
    let bookings = vec![BookingInterval {
        range: range(date(2025, 1, 10), date(2025, 1, 15)),
        status: BookingStatus::Pending,
    }];
    let r = resource(dec!(45), None, None);
    let requested = range(date(2025, 1, 12), date(2025, 1, 13));
    assert!(is_available(&r, &requested, &bookings, &[]).unwrap());
    let strict = BlockingPolicy {
        pending_holds_block: true,
    };
    assert!(!is_available_with(strict, &r, &requested, &bookings, &[]).unwrap());
}

// ---------------------------------------------------------------------------
// Invalid ranges
// ---------------------------------------------------------------------------

#[test]
fn end_before_or_equal_start_is_rejected() {
    for (start, end) in [
        (date(2025, 1, 10), date(2025, 1, 10)),
        (date(2025, 1, 10), date(2025, 1, 5)),
    ] {
        assert!(matches!(
            DateRange::new(start, end),
            Err(RentalError::InvalidRange { .. })
        ));

        let bad = DateRange { start, end };
        let r = resource(dec!(45), None, None);
        assert!(matches!(
            calculate_price(&r, &bad),
            Err(RentalError::InvalidRange { .. })
        ));
        assert!(matches!(
            is_available(&r, &bad, &[], &[]),
            Err(RentalError::InvalidRange { .. })
        ));
    }
}

#[test]
fn malformed_stored_interval_is_rejected() {
    let bookings = vec![BookingInterval {
        range: DateRange {
            start: date(2025, 1, 15),
            end: date(2025, 1, 10),
        },
        status: BookingStatus::Cancelled,
    }];
    let result = is_available(
        &resource(dec!(45), None, None),
        &range(date(2025, 3, 1), date(2025, 3, 2)),
        &bookings,
        &[],
    );
    assert!(matches!(result, Err(RentalError::InvalidRange { .. })));
}
