use async_trait::async_trait;

use crate::domain::availability::BlockingPolicy;
use crate::domain::booking::{BlackoutInterval, BookingRecord, BookingStatus};
use crate::domain::resource::RentalResource;
use crate::error::Result;

/// Storage collaborator for resources, bookings and blackouts.
///
/// Implementations are the source of truth for exclusivity:
/// [`insert_booking`](RentalStore::insert_booking) must re-check overlap and
/// write in one atomic step, so that two requests which both passed the
/// optimistic availability check cannot both be persisted.
#[async_trait]
pub trait RentalStore: Send + Sync {
    async fn get_resource(&self, id: &str) -> Result<RentalResource>;
    /// Every registered resource, ordered by id.
    async fn list_resources(&self) -> Result<Vec<RentalResource>>;
    async fn put_resource(&self, resource: RentalResource) -> Result<()>;

    /// All bookings for one resource, in insertion order.
    async fn bookings_for(&self, resource_id: &str) -> Result<Vec<BookingRecord>>;
    async fn blackouts_for(&self, resource_id: &str) -> Result<Vec<BlackoutInterval>>;

    async fn get_booking(&self, id: &str) -> Result<BookingRecord>;

    /// Persist `booking` unless a booking blocking under `policy`, or a
    /// blackout, overlaps it. Fails with `BookingConflict` otherwise.
    async fn insert_booking(
        &self,
        booking: BookingRecord,
        policy: BlockingPolicy,
    ) -> Result<BookingRecord>;

    /// Move a booking to `status`, checking the lifecycle transition and,
    /// when the booking starts blocking under `policy`, overlap with the
    /// other bookings, in the same atomic step.
    async fn set_booking_status(
        &self,
        id: &str,
        status: BookingStatus,
        policy: BlockingPolicy,
    ) -> Result<BookingRecord>;

    async fn add_blackout(&self, resource_id: &str, blackout: BlackoutInterval) -> Result<()>;
}
