//! Availability checks over caller-supplied intervals.
//!
//! Everything here is pure: the caller hands in the bookings and blackouts
//! already filtered to one resource, and gets a decision back. This is an
//! optimistic pre-check for feedback to the renter. Exclusivity itself is
//! enforced by the storage layer when the booking is written (see
//! [`crate::ports::rental_store::RentalStore::insert_booking`]), because two
//! requests can both pass this check before either one is persisted.

use serde::{Deserialize, Serialize};

use super::booking::{BlackoutInterval, BookingInterval, BookingStatus};
use super::date_range::DateRange;
use super::resource::RentalResource;
use crate::error::{RentalError, Result};

/// Which booking statuses occupy a resource.
///
/// CONFIRMED and ACTIVE always block. PENDING blocks only when the caller
/// treats holds as reservations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockingPolicy {
    #[serde(default)]
    pub pending_holds_block: bool,
}

impl BlockingPolicy {
    pub fn blocks(self, status: BookingStatus) -> bool {
        match status {
            BookingStatus::Confirmed | BookingStatus::Active => true,
            BookingStatus::Pending => self.pending_holds_block,
            BookingStatus::Completed | BookingStatus::Cancelled => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "note")]
pub enum UnavailabilityReason {
    Booked,
    Blocked(Option<String>),
}

impl std::fmt::Display for UnavailabilityReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Booked => f.write_str("booked"),
            Self::Blocked(Some(reason)) => f.write_str(reason),
            Self::Blocked(None) => f.write_str("blocked"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnavailableWindow {
    pub range: DateRange,
    pub reason: UnavailabilityReason,
}

/// Available iff `requested` overlaps no CONFIRMED/ACTIVE booking and no
/// blackout. Same-day turnover (one range ending where the other starts)
/// is available.
pub fn is_available(
    resource: &RentalResource,
    requested: &DateRange,
    bookings: &[BookingInterval],
    blackouts: &[BlackoutInterval],
) -> Result<bool> {
    is_available_with(
        BlockingPolicy::default(),
        resource,
        requested,
        bookings,
        blackouts,
    )
}

/// [`is_available`] under an explicit blocking policy.
///
/// Every supplied interval is validated before any overlap test, so a
/// corrupt range surfaces as `InvalidRange` instead of a false "free".
pub fn is_available_with(
    policy: BlockingPolicy,
    _resource: &RentalResource,
    requested: &DateRange,
    bookings: &[BookingInterval],
    blackouts: &[BlackoutInterval],
) -> Result<bool> {
    validate_inputs(requested, bookings, blackouts)?;

    let booked = bookings
        .iter()
        .filter(|b| policy.blocks(b.status))
        .any(|b| b.range.overlaps(requested));
    if booked {
        return Ok(false);
    }
    Ok(!blackouts.iter().any(|b| b.range.overlaps(requested)))
}

/// `false` when the rental is shorter than `min_rental_days` or longer than
/// `max_rental_days`.
pub fn is_duration_valid(resource: &RentalResource, requested: &DateRange) -> Result<bool> {
    requested.validate()?;
    let days = requested.days();
    let too_short = days < i64::from(resource.min_rental_days);
    let too_long = resource
        .max_rental_days
        .is_some_and(|max| days > i64::from(max));
    Ok(!too_short && !too_long)
}

/// Like [`is_duration_valid`] but reports the violation as an error.
pub fn check_duration(resource: &RentalResource, requested: &DateRange) -> Result<()> {
    if is_duration_valid(resource, requested)? {
        Ok(())
    } else {
        Err(RentalError::DurationOutOfBounds {
            days: requested.days(),
            min: resource.min_rental_days,
            max: resource.max_rental_days,
        })
    }
}

/// All blocking windows, sorted by start date.
pub fn unavailable_windows(
    policy: BlockingPolicy,
    bookings: &[BookingInterval],
    blackouts: &[BlackoutInterval],
) -> Result<Vec<UnavailableWindow>> {
    validate_intervals(bookings, blackouts)?;

    let mut windows: Vec<UnavailableWindow> = bookings
        .iter()
        .filter(|b| policy.blocks(b.status))
        .map(|b| UnavailableWindow {
            range: b.range,
            reason: UnavailabilityReason::Booked,
        })
        .chain(blackouts.iter().map(|b| UnavailableWindow {
            range: b.range,
            reason: UnavailabilityReason::Blocked(b.reason.clone()),
        }))
        .collect();
    windows.sort_by_key(|w| (w.range.start, w.range.end));
    Ok(windows)
}

/// Blocking windows that collide with `requested`.
pub fn conflicts(
    policy: BlockingPolicy,
    requested: &DateRange,
    bookings: &[BookingInterval],
    blackouts: &[BlackoutInterval],
) -> Result<Vec<UnavailableWindow>> {
    requested.validate()?;
    Ok(unavailable_windows(policy, bookings, blackouts)?
        .into_iter()
        .filter(|w| w.range.overlaps(requested))
        .collect())
}

fn validate_inputs(
    requested: &DateRange,
    bookings: &[BookingInterval],
    blackouts: &[BlackoutInterval],
) -> Result<()> {
    requested.validate()?;
    validate_intervals(bookings, blackouts)
}

/// Stored intervals must be non-empty whatever their status.
fn validate_intervals(bookings: &[BookingInterval], blackouts: &[BlackoutInterval]) -> Result<()> {
    bookings
        .iter()
        .map(|b| &b.range)
        .chain(blackouts.iter().map(|b| &b.range))
        .try_for_each(DateRange::validate)
}
