use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{RentalError, Result};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A rental period of calendar days, half-open: `[start, end)`.
///
/// The day `end` itself is not part of the rental, so a booking ending on
/// the 15th and another starting on the 15th do not collide (same-day
/// turnover).
///
/// Fields are public because ranges arrive as plain data from storage;
/// every operation that depends on `end > start` calls [`DateRange::validate`]
/// first instead of trusting the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Build a range, rejecting `end <= start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        let range = Self { start, end };
        range.validate()?;
        Ok(range)
    }

    /// Parse two `YYYY-MM-DD` strings into a validated range.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        let start = parse_date(start, "start")?;
        let end = parse_date(end, "end")?;
        Self::new(start, end)
    }

    pub fn validate(&self) -> Result<()> {
        if self.end <= self.start {
            return Err(RentalError::InvalidRange { range: *self });
        }
        Ok(())
    }

    /// Whole calendar days covered, i.e. `end - start`.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// `[a, b)` and `[c, d)` overlap iff `a < d && c < b`.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day < self.end
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}, {})",
            self.start.format(DATE_FORMAT),
            self.end.format(DATE_FORMAT)
        )
    }
}

fn parse_date(value: &str, which: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| RentalError::InvalidParams {
        reason: format!("invalid {which} date format '{value}', expected YYYY-MM-DD"),
    })
}
