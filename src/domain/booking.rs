use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::date_range::DateRange;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Active,
    Completed,
    Cancelled,
}

impl BookingStatus {
    /// Whether the status leaves the booking with any further moves.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Lifecycle: PENDING -> CONFIRMED -> ACTIVE -> COMPLETED, with
    /// cancellation allowed until the rental starts.
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Confirmed | Self::Cancelled)
                | (Self::Confirmed, Self::Active | Self::Cancelled)
                | (Self::Active, Self::Completed)
        )
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::Active => "ACTIVE",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        };
        f.write_str(s)
    }
}

/// An existing commitment against a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingInterval {
    pub range: DateRange,
    pub status: BookingStatus,
}

/// Host-declared unavailable window. Always blocking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlackoutInterval {
    pub range: DateRange,
    #[serde(default)]
    pub reason: Option<String>,
}

/// A persisted booking as the storage layer keeps it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRecord {
    pub id: String,
    pub resource_id: String,
    pub renter_id: String,
    pub range: DateRange,
    pub status: BookingStatus,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
}

impl BookingRecord {
    pub fn interval(&self) -> BookingInterval {
        BookingInterval {
            range: self.range,
            status: self.status,
        }
    }
}

impl std::fmt::Display for BookingRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "# Booking {}", self.id)?;
        writeln!(f, "Resource: {}", self.resource_id)?;
        writeln!(f, "Renter: {}", self.renter_id)?;
        writeln!(f, "Dates: {} ({} day(s))", self.range, self.range.days())?;
        writeln!(f, "Status: {}", self.status)?;
        writeln!(f, "Total: {}", self.total_amount)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::make_booking_record;

    #[test]
    fn forward_transitions_allowed() {
        assert!(BookingStatus::Pending.can_transition_to(BookingStatus::Confirmed));
        assert!(BookingStatus::Confirmed.can_transition_to(BookingStatus::Active));
        assert!(BookingStatus::Active.can_transition_to(BookingStatus::Completed));
    }

    #[test]
    fn cancel_only_before_start() {
        assert!(BookingStatus::Pending.can_transition_to(BookingStatus::Cancelled));
        assert!(BookingStatus::Confirmed.can_transition_to(BookingStatus::Cancelled));
        assert!(!BookingStatus::Active.can_transition_to(BookingStatus::Cancelled));
    }

    #[test]
    fn terminal_states_are_final() {
        for next in [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::Active,
            BookingStatus::Completed,
            BookingStatus::Cancelled,
        ] {
            assert!(!BookingStatus::Completed.can_transition_to(next));
            assert!(!BookingStatus::Cancelled.can_transition_to(next));
        }
        assert!(BookingStatus::Completed.is_terminal());
        assert!(!BookingStatus::Active.is_terminal());
    }

    #[test]
    fn status_serializes_screaming_case() {
        let json = serde_json::to_string(&BookingStatus::Confirmed).unwrap();
        assert_eq!(json, "\"CONFIRMED\"");
        let status: BookingStatus = serde_json::from_str("\"CANCELLED\"").unwrap();
        assert_eq!(status, BookingStatus::Cancelled);
    }

    #[test]
    fn record_display_contains_key_fields() {
        let record = make_booking_record("b-1", "s-1", (2025, 1, 10), (2025, 1, 15));
        let text = record.to_string();
        assert!(text.contains("Booking b-1"));
        assert!(text.contains("5 day(s)"));
        assert!(text.contains("CONFIRMED"));
    }
}
