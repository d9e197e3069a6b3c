use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::booking::BookingStatus;
use crate::domain::date_range::DateRange;

#[derive(Error, Debug)]
pub enum RentalError {
    #[error("Invalid date range {range}: end must be after start")]
    InvalidRange { range: DateRange },

    #[error("Invalid rate: {field} must be positive, got {value}")]
    InvalidRate { field: &'static str, value: Decimal },

    #[error("Rental of {days} day(s) is outside the allowed duration ({min}..={})", upper_bound(.max))]
    DurationOutOfBounds {
        days: i64,
        min: u32,
        max: Option<u32>,
    },

    #[error("Amount overflow while computing {what}: rates are too large to price this rental")]
    AmountOverflow { what: &'static str },

    #[error("Invalid parameters: {reason}")]
    InvalidParams { reason: String },

    #[error("Resource not found: {id}")]
    ResourceNotFound { id: String },

    #[error("Booking not found: {id}")]
    BookingNotFound { id: String },

    #[error("Resource {resource_id} is not available for {range}")]
    Unavailable {
        resource_id: String,
        range: DateRange,
    },

    #[error("Booking conflict: resource {resource_id} was already booked for {range}")]
    BookingConflict {
        resource_id: String,
        range: DateRange,
    },

    #[error("Cannot move booking from {from} to {to}")]
    InvalidTransition { from: BookingStatus, to: BookingStatus },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yml::Error),
}

pub type Result<T> = std::result::Result<T, RentalError>;

#[allow(clippy::ref_option)]
fn upper_bound(max: &Option<u32>) -> String {
    max.map_or_else(|| "unbounded".to_string(), |m| m.to_string())
}
