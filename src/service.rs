use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::types::Config;
use crate::domain::availability::{self, BlockingPolicy, UnavailableWindow};
use crate::domain::booking::{BlackoutInterval, BookingInterval, BookingRecord, BookingStatus};
use crate::domain::date_range::DateRange;
use crate::domain::equipment::EquipmentCategory;
use crate::domain::pricing::{self, PriceQuote, PricingPolicy};
use crate::domain::resource::RentalResource;
use crate::error::{RentalError, Result};
use crate::ports::rental_store::RentalStore;

const MAX_BLACKOUT_REASON_LEN: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub resource_id: String,
    pub renter_id: String,
    pub range: DateRange,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityReport {
    pub resource_id: String,
    pub range: DateRange,
    pub available: bool,
    pub duration_valid: bool,
    pub conflicts: Vec<UnavailableWindow>,
}

impl AvailabilityReport {
    pub fn bookable(&self) -> bool {
        self.available && self.duration_valid
    }
}

impl std::fmt::Display for AvailabilityReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "# Availability: resource {}", self.resource_id)?;
        writeln!(f, "Requested: {} ({} day(s))", self.range, self.range.days())?;
        writeln!(
            f,
            "Available: {}",
            if self.available { "Yes" } else { "No" }
        )?;
        if !self.duration_valid {
            writeln!(f, "Duration: outside the allowed rental length")?;
        }
        writeln!(f, "Bookable: {}", if self.bookable() { "Yes" } else { "No" })?;
        if !self.conflicts.is_empty() {
            writeln!(f, "\nConflicts:")?;
            for window in &self.conflicts {
                writeln!(f, "  {}: {}", window.range, window.reason)?;
            }
        }
        Ok(())
    }
}

/// Filters for [`BookingService::search_available`]. Every field is optional;
/// an empty search lists every resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilitySearch {
    /// Only resources free for the whole range.
    pub range: Option<DateRange>,
    /// Only resources whose equipment is of this kind.
    pub category: Option<EquipmentCategory>,
    pub min_daily_rate: Option<Decimal>,
    pub max_daily_rate: Option<Decimal>,
}

impl AvailabilitySearch {
    fn validate(&self) -> Result<()> {
        if let Some(range) = &self.range {
            range.validate()?;
        }
        if let (Some(min), Some(max)) = (self.min_daily_rate, self.max_daily_rate)
            && min > max
        {
            return Err(RentalError::InvalidParams {
                reason: format!("min_daily_rate {min} is greater than max_daily_rate {max}"),
            });
        }
        Ok(())
    }

    fn matches_listing(&self, resource: &RentalResource) -> bool {
        let category_ok = self.category.is_none_or(|wanted| {
            resource
                .equipment
                .as_ref()
                .is_some_and(|e| e.category() == wanted)
        });
        let min_ok = self.min_daily_rate.is_none_or(|min| resource.daily_rate >= min);
        let max_ok = self.max_daily_rate.is_none_or(|max| resource.daily_rate <= max);
        category_ok && min_ok && max_ok
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingConfirmation {
    pub booking: BookingRecord,
    pub quote: PriceQuote,
}

impl std::fmt::Display for BookingConfirmation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.booking)?;
        writeln!(f)?;
        write!(f, "{}", self.quote)
    }
}

/// The booking orchestrator: loads intervals from the store, runs the pure
/// availability and pricing checks, and hands the write to the store, which
/// has the final word on exclusivity.
pub struct BookingService {
    store: Arc<dyn RentalStore>,
    pricing: PricingPolicy,
    blocking: BlockingPolicy,
}

impl BookingService {
    pub fn new(store: Arc<dyn RentalStore>, pricing: PricingPolicy, blocking: BlockingPolicy) -> Self {
        Self {
            store,
            pricing,
            blocking,
        }
    }

    pub fn from_config(store: Arc<dyn RentalStore>, config: &Config) -> Self {
        Self::new(
            store,
            config.pricing.policy(),
            config.availability.policy(),
        )
    }

    pub async fn register_resource(&self, resource: RentalResource) -> Result<RentalResource> {
        resource.validate()?;
        self.store.put_resource(resource.clone()).await?;
        tracing::info!(resource_id = %resource.id, "registered resource");
        Ok(resource)
    }

    pub async fn resource(&self, id: &str) -> Result<RentalResource> {
        self.store.get_resource(id).await
    }

    async fn intervals(
        &self,
        resource_id: &str,
    ) -> Result<(Vec<BookingInterval>, Vec<BlackoutInterval>)> {
        let bookings: Vec<BookingInterval> = self
            .store
            .bookings_for(resource_id)
            .await?
            .iter()
            .map(BookingRecord::interval)
            .collect();
        let blackouts = self.store.blackouts_for(resource_id).await?;
        Ok((bookings, blackouts))
    }

    pub async fn check_availability(
        &self,
        resource_id: &str,
        range: DateRange,
    ) -> Result<AvailabilityReport> {
        let resource = self.store.get_resource(resource_id).await?;
        let (bookings, blackouts) = self.intervals(resource_id).await?;

        let available =
            availability::is_available_with(self.blocking, &resource, &range, &bookings, &blackouts)?;
        let duration_valid = availability::is_duration_valid(&resource, &range)?;
        let conflicts = availability::conflicts(self.blocking, &range, &bookings, &blackouts)?;

        Ok(AvailabilityReport {
            resource_id: resource.id,
            range,
            available,
            duration_valid,
            conflicts,
        })
    }

    pub async fn quote(&self, resource_id: &str, range: DateRange) -> Result<PriceQuote> {
        let resource = self.store.get_resource(resource_id).await?;
        pricing::calculate_price_with(&self.pricing, &resource, &range)
    }

    /// Validate, pre-check, price and persist a booking.
    ///
    /// `Unavailable` means the optimistic check already saw a collision;
    /// `BookingConflict` means another booking won the race between that
    /// check and the write.
    pub async fn book(&self, request: BookingRequest) -> Result<BookingConfirmation> {
        if request.renter_id.trim().is_empty() {
            return Err(RentalError::InvalidParams {
                reason: "renter_id is required".into(),
            });
        }
        let resource = self.store.get_resource(&request.resource_id).await?;
        request.range.validate()?;
        availability::check_duration(&resource, &request.range)?;

        let (bookings, blackouts) = self.intervals(&resource.id).await?;
        if !availability::is_available_with(
            self.blocking,
            &resource,
            &request.range,
            &bookings,
            &blackouts,
        )? {
            return Err(RentalError::Unavailable {
                resource_id: resource.id,
                range: request.range,
            });
        }

        let quote = pricing::calculate_price_with(&self.pricing, &resource, &request.range)?;
        let record = BookingRecord {
            id: Uuid::new_v4().to_string(),
            resource_id: resource.id,
            renter_id: request.renter_id,
            range: request.range,
            status: BookingStatus::Confirmed,
            total_amount: quote.total_amount,
            created_at: Utc::now(),
        };

        match self.store.insert_booking(record, self.blocking).await {
            Ok(booking) => {
                tracing::info!(
                    booking_id = %booking.id,
                    resource_id = %booking.resource_id,
                    range = %booking.range,
                    total = %booking.total_amount,
                    "booking confirmed"
                );
                Ok(BookingConfirmation { booking, quote })
            }
            Err(e) => {
                tracing::warn!(range = %request.range, "booking rejected by store: {e}");
                Err(e)
            }
        }
    }

    pub async fn update_status(&self, booking_id: &str, status: BookingStatus) -> Result<BookingRecord> {
        let booking = self
            .store
            .set_booking_status(booking_id, status, self.blocking)
            .await?;
        tracing::info!(booking_id, status = %booking.status, "booking status updated");
        Ok(booking)
    }

    pub async fn list_bookings(
        &self,
        resource_id: &str,
        status: Option<BookingStatus>,
    ) -> Result<Vec<BookingRecord>> {
        self.store.get_resource(resource_id).await?;
        let mut bookings = self.store.bookings_for(resource_id).await?;
        if let Some(status) = status {
            bookings.retain(|b| b.status == status);
        }
        Ok(bookings)
    }

    pub async fn add_blackout(&self, resource_id: &str, blackout: BlackoutInterval) -> Result<()> {
        blackout.range.validate()?;
        if let Some(ref reason) = blackout.reason
            && reason.chars().count() > MAX_BLACKOUT_REASON_LEN
        {
            return Err(RentalError::InvalidParams {
                reason: format!("blackout reason must be at most {MAX_BLACKOUT_REASON_LEN} characters"),
            });
        }
        let range = blackout.range;
        self.store.add_blackout(resource_id, blackout).await?;
        tracing::info!(resource_id, range = %range, "blackout added");
        Ok(())
    }

    /// Resources matching `search`, ordered by id. With a range, only those
    /// with no blocking booking or blackout overlapping it are returned.
    pub async fn search_available(
        &self,
        search: &AvailabilitySearch,
    ) -> Result<Vec<RentalResource>> {
        search.validate()?;
        let mut found = Vec::new();
        for resource in self.store.list_resources().await? {
            if !search.matches_listing(&resource) {
                continue;
            }
            if let Some(range) = &search.range {
                let (bookings, blackouts) = self.intervals(&resource.id).await?;
                if !availability::is_available_with(
                    self.blocking,
                    &resource,
                    range,
                    &bookings,
                    &blackouts,
                )? {
                    continue;
                }
            }
            found.push(resource);
        }
        tracing::debug!(matches = found.len(), "availability search");
        Ok(found)
    }

    pub async fn unavailable_windows(&self, resource_id: &str) -> Result<Vec<UnavailableWindow>> {
        self.store.get_resource(resource_id).await?;
        let (bookings, blackouts) = self.intervals(resource_id).await?;
        availability::unavailable_windows(self.blocking, &bookings, &blackouts)
    }
}
