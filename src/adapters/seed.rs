//! YAML seed data for the in-memory store.
//!
//! ```yaml
//! resources:
//!   - id: scooter-1
//!     daily_rate: 45
//!     weekly_rate: 270
//! bookings:
//!   - resource_id: scooter-1
//!     range: { start: 2025-01-10, end: 2025-01-15 }
//!     status: CONFIRMED
//! blackouts:
//!   - resource_id: scooter-1
//!     range: { start: 2025-02-01, end: 2025-02-05 }
//!     reason: maintenance
//! ```

use std::path::Path;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::memory_store::InMemoryStore;
use crate::domain::availability::BlockingPolicy;
use crate::domain::booking::{BlackoutInterval, BookingRecord, BookingStatus};
use crate::domain::date_range::DateRange;
use crate::domain::resource::RentalResource;
use crate::error::{RentalError, Result};
use crate::ports::rental_store::RentalStore;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Seed {
    #[serde(default)]
    pub resources: Vec<RentalResource>,
    #[serde(default)]
    pub bookings: Vec<SeedBooking>,
    #[serde(default)]
    pub blackouts: Vec<SeedBlackout>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedBooking {
    #[serde(default)]
    pub id: Option<String>,
    pub resource_id: String,
    #[serde(default = "default_renter")]
    pub renter_id: String,
    pub range: DateRange,
    pub status: BookingStatus,
    #[serde(default)]
    pub total_amount: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedBlackout {
    pub resource_id: String,
    pub range: DateRange,
    #[serde(default)]
    pub reason: Option<String>,
}

fn default_renter() -> String {
    "seed".into()
}

pub fn parse_seed(content: &str) -> Result<Seed> {
    if content.trim().is_empty() {
        return Ok(Seed::default());
    }
    Ok(serde_yml::from_str(content)?)
}

pub fn load_seed(path: &Path) -> Result<Seed> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        RentalError::Config(format!("failed to read seed file {}: {e}", path.display()))
    })?;
    parse_seed(&content)
}

impl Seed {
    /// Load into `store` through the same validation and conflict checks as
    /// live traffic.
    pub async fn apply(self, store: &dyn RentalStore, policy: BlockingPolicy) -> Result<()> {
        for resource in self.resources {
            resource.validate()?;
            store.put_resource(resource).await?;
        }
        for blackout in self.blackouts {
            store
                .add_blackout(
                    &blackout.resource_id,
                    BlackoutInterval {
                        range: blackout.range,
                        reason: blackout.reason,
                    },
                )
                .await?;
        }
        for (i, booking) in self.bookings.into_iter().enumerate() {
            let record = BookingRecord {
                id: booking.id.unwrap_or_else(|| format!("seed-{i}")),
                resource_id: booking.resource_id,
                renter_id: booking.renter_id,
                range: booking.range,
                status: booking.status,
                total_amount: booking.total_amount,
                created_at: Utc::now(),
            };
            store.insert_booking(record, policy).await?;
        }
        Ok(())
    }

    pub async fn into_store(self, policy: BlockingPolicy) -> Result<InMemoryStore> {
        let store = InMemoryStore::new();
        self.apply(&store, policy).await?;
        Ok(store)
    }
}
