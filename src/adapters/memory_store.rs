use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::availability::BlockingPolicy;
use crate::domain::booking::{BlackoutInterval, BookingRecord, BookingStatus};
use crate::domain::date_range::DateRange;
use crate::domain::resource::RentalResource;
use crate::error::{RentalError, Result};
use crate::ports::rental_store::RentalStore;

#[derive(Debug, Default)]
struct StoreState {
    resources: HashMap<String, RentalResource>,
    bookings: Vec<BookingRecord>,
    blackouts: HashMap<String, Vec<BlackoutInterval>>,
}

impl StoreState {
    /// Overlap test run under the write lock, excluding `skip_id`.
    fn collides(
        &self,
        resource_id: &str,
        range: &DateRange,
        policy: BlockingPolicy,
        skip_id: Option<&str>,
    ) -> bool {
        let booked = self.bookings.iter().any(|b| {
            b.resource_id == resource_id
                && Some(b.id.as_str()) != skip_id
                && policy.blocks(b.status)
                && b.range.overlaps(range)
        });
        booked
            || self
                .blackouts
                .get(resource_id)
                .is_some_and(|list| list.iter().any(|b| b.range.overlaps(range)))
    }
}

/// Process-local store. All writes that affect exclusivity happen under a
/// single write lock, which makes check-and-insert atomic.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<StoreState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RentalStore for InMemoryStore {
    async fn get_resource(&self, id: &str) -> Result<RentalResource> {
        self.state
            .read()
            .await
            .resources
            .get(id)
            .cloned()
            .ok_or_else(|| RentalError::ResourceNotFound { id: id.to_string() })
    }

    async fn list_resources(&self) -> Result<Vec<RentalResource>> {
        let mut resources: Vec<RentalResource> =
            self.state.read().await.resources.values().cloned().collect();
        resources.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(resources)
    }

    async fn put_resource(&self, resource: RentalResource) -> Result<()> {
        self.state
            .write()
            .await
            .resources
            .insert(resource.id.clone(), resource);
        Ok(())
    }

    async fn bookings_for(&self, resource_id: &str) -> Result<Vec<BookingRecord>> {
        Ok(self
            .state
            .read()
            .await
            .bookings
            .iter()
            .filter(|b| b.resource_id == resource_id)
            .cloned()
            .collect())
    }

    async fn blackouts_for(&self, resource_id: &str) -> Result<Vec<BlackoutInterval>> {
        Ok(self
            .state
            .read()
            .await
            .blackouts
            .get(resource_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_booking(&self, id: &str) -> Result<BookingRecord> {
        self.state
            .read()
            .await
            .bookings
            .iter()
            .find(|b| b.id == id)
            .cloned()
            .ok_or_else(|| RentalError::BookingNotFound { id: id.to_string() })
    }

    async fn insert_booking(
        &self,
        booking: BookingRecord,
        policy: BlockingPolicy,
    ) -> Result<BookingRecord> {
        booking.range.validate()?;
        let mut state = self.state.write().await;
        if !state.resources.contains_key(&booking.resource_id) {
            return Err(RentalError::ResourceNotFound {
                id: booking.resource_id,
            });
        }
        if policy.blocks(booking.status)
            && state.collides(&booking.resource_id, &booking.range, policy, None)
        {
            return Err(RentalError::BookingConflict {
                resource_id: booking.resource_id,
                range: booking.range,
            });
        }
        state.bookings.push(booking.clone());
        Ok(booking)
    }

    async fn set_booking_status(
        &self,
        id: &str,
        status: BookingStatus,
        policy: BlockingPolicy,
    ) -> Result<BookingRecord> {
        let mut state = self.state.write().await;
        let index = state
            .bookings
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| RentalError::BookingNotFound { id: id.to_string() })?;

        let current = &state.bookings[index];
        if !current.status.can_transition_to(status) {
            return Err(RentalError::InvalidTransition {
                from: current.status,
                to: status,
            });
        }
        if policy.blocks(status)
            && !policy.blocks(current.status)
            && state.collides(&current.resource_id, &current.range, policy, Some(id))
        {
            return Err(RentalError::BookingConflict {
                resource_id: current.resource_id.clone(),
                range: current.range,
            });
        }

        state.bookings[index].status = status;
        Ok(state.bookings[index].clone())
    }

    async fn add_blackout(&self, resource_id: &str, blackout: BlackoutInterval) -> Result<()> {
        blackout.range.validate()?;
        let mut state = self.state.write().await;
        if !state.resources.contains_key(resource_id) {
            return Err(RentalError::ResourceNotFound {
                id: resource_id.to_string(),
            });
        }
        state
            .blackouts
            .entry(resource_id.to_string())
            .or_default()
            .push(blackout);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::test_helpers::{blackout, date, make_booking_record, make_resource};
    use rust_decimal_macros::dec;

    async fn store_with_scooter() -> InMemoryStore {
        let store = InMemoryStore::new();
        store
            .put_resource(make_resource("s-1", dec!(45)))
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn missing_resource_is_not_found() {
        let store = InMemoryStore::new();
        let err = store.get_resource("nope").await.unwrap_err();
        assert!(matches!(err, RentalError::ResourceNotFound { .. }));
    }

    #[tokio::test]
    async fn resources_listed_by_id() {
        let store = store_with_scooter().await;
        store
            .put_resource(make_resource("a-1", dec!(10)))
            .await
            .unwrap();
        let ids: Vec<String> = store
            .list_resources()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["a-1", "s-1"]);
    }

    #[test]
    fn store_is_debug() {
        let rendered = format!("{:?}", InMemoryStore::new());
        assert!(rendered.contains("InMemoryStore"));
    }

    #[tokio::test]
    async fn insert_then_list_bookings() {
        let store = store_with_scooter().await;
        let booking = make_booking_record("b-1", "s-1", (2025, 1, 10), (2025, 1, 15));
        store
            .insert_booking(booking.clone(), BlockingPolicy::default())
            .await
            .unwrap();
        let listed = store.bookings_for("s-1").await.unwrap();
        assert_eq!(listed, vec![booking]);
        assert!(store.bookings_for("other").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn overlapping_insert_is_conflict() {
        let store = store_with_scooter().await;
        store
            .insert_booking(
                make_booking_record("b-1", "s-1", (2025, 1, 10), (2025, 1, 15)),
                BlockingPolicy::default(),
            )
            .await
            .unwrap();
        let err = store
            .insert_booking(
                make_booking_record("b-2", "s-1", (2025, 1, 12), (2025, 1, 16)),
                BlockingPolicy::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RentalError::BookingConflict { .. }));
    }

    #[tokio::test]
    async fn adjacent_insert_succeeds() {
        let store = store_with_scooter().await;
        for (id, start, end) in [
            ("b-1", (2025, 1, 10), (2025, 1, 15)),
            ("b-2", (2025, 1, 15), (2025, 1, 18)),
        ] {
            store
                .insert_booking(
                    make_booking_record(id, "s-1", start, end),
                    BlockingPolicy::default(),
                )
                .await
                .unwrap();
        }
        assert_eq!(store.bookings_for("s-1").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn insert_over_blackout_is_conflict() {
        let store = store_with_scooter().await;
        store
            .add_blackout("s-1", blackout((2025, 2, 1), (2025, 2, 5), None))
            .await
            .unwrap();
        let err = store
            .insert_booking(
                make_booking_record("b-1", "s-1", (2025, 2, 3), (2025, 2, 4)),
                BlockingPolicy::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RentalError::BookingConflict { .. }));
    }

    #[tokio::test]
    async fn blackout_for_unknown_resource_fails() {
        let store = InMemoryStore::new();
        let err = store
            .add_blackout("ghost", blackout((2025, 2, 1), (2025, 2, 5), None))
            .await
            .unwrap_err();
        assert!(matches!(err, RentalError::ResourceNotFound { .. }));
    }

    #[tokio::test]
    async fn status_transition_checked_atomically() {
        let store = store_with_scooter().await;
        store
            .insert_booking(
                make_booking_record("b-1", "s-1", (2025, 1, 10), (2025, 1, 15)),
                BlockingPolicy::default(),
            )
            .await
            .unwrap();
        let updated = store
            .set_booking_status("b-1", BookingStatus::Active, BlockingPolicy::default())
            .await
            .unwrap();
        assert_eq!(updated.status, BookingStatus::Active);

        let err = store
            .set_booking_status("b-1", BookingStatus::Pending, BlockingPolicy::default())
            .await
            .unwrap_err();
        assert!(matches!(err, RentalError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn confirming_pending_hold_rechecks_overlap() {
        let store = store_with_scooter().await;
        let mut hold = make_booking_record("hold", "s-1", (2025, 1, 10), (2025, 1, 15));
        hold.status = BookingStatus::Pending;
        store
            .insert_booking(hold, BlockingPolicy::default())
            .await
            .unwrap();
        store
            .insert_booking(
                make_booking_record("b-2", "s-1", (2025, 1, 12), (2025, 1, 14)),
                BlockingPolicy::default(),
            )
            .await
            .unwrap();

        let err = store
            .set_booking_status("hold", BookingStatus::Confirmed, BlockingPolicy::default())
            .await
            .unwrap_err();
        assert!(matches!(err, RentalError::BookingConflict { .. }));
        assert_eq!(
            store.get_booking("hold").await.unwrap().status,
            BookingStatus::Pending
        );
    }

    #[tokio::test]
    async fn concurrent_inserts_admit_exactly_one() {
        let store = Arc::new(store_with_scooter().await);
        let mut handles = Vec::new();
        for i in 0..16 {
            let s = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                s.insert_booking(
                    make_booking_record(&format!("b-{i}"), "s-1", (2025, 5, 1), (2025, 5, 4)),
                    BlockingPolicy::default(),
                )
                .await
            }));
        }
        let mut ok = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                ok += 1;
            }
        }
        assert_eq!(ok, 1);
        assert_eq!(store.bookings_for("s-1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn reversed_range_rejected_on_insert() {
        let store = store_with_scooter().await;
        let mut booking = make_booking_record("b-1", "s-1", (2025, 1, 10), (2025, 1, 15));
        booking.range = DateRange {
            start: date(2025, 1, 15),
            end: date(2025, 1, 10),
        };
        let err = store
            .insert_booking(booking, BlockingPolicy::default())
            .await
            .unwrap_err();
        assert!(matches!(err, RentalError::InvalidRange { .. }));
    }
}
