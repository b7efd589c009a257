use std::collections::HashMap;

use crate::domain::{models::booking::{Booking, BookingStatus}, ports::BookingRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::warn;

/// Process-local booking store with the same compare-and-swap contract as the
/// SQL adapters. The write lock makes each `update_atomic` a single step.
#[derive(Default)]
pub struct MemoryBookingRepo {
    bookings: RwLock<HashMap<String, Booking>>,
}

impl MemoryBookingRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookingRepository for MemoryBookingRepo {
    async fn create(&self, booking: &Booking) -> Result<Booking, AppError> {
        let mut bookings = self.bookings.write().await;
        if bookings.contains_key(&booking.id) {
            return Err(AppError::WriteConflict(format!("booking {} already exists", booking.id)));
        }
        bookings.insert(booking.id.clone(), booking.clone());
        Ok(booking.clone())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError> {
        Ok(self.bookings.read().await.get(id).cloned())
    }

    async fn list_for_party(&self, user_id: &str, status: Option<BookingStatus>) -> Result<Vec<Booking>, AppError> {
        let mut found: Vec<Booking> = self
            .bookings
            .read()
            .await
            .values()
            .filter(|b| b.is_party(user_id))
            .filter(|b| status.is_none_or(|s| b.status == s))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn update_atomic(&self, booking: &Booking) -> Result<Booking, AppError> {
        let mut bookings = self.bookings.write().await;
        let stored = bookings
            .get_mut(&booking.id)
            .ok_or_else(|| AppError::NotFound("Booking not found".into()))?;

        if stored.version != booking.version {
            warn!(booking_id = %booking.id, version = booking.version, "Stale booking version on update");
            return Err(AppError::WriteConflict(format!(
                "booking {} changed since version {}",
                booking.id, booking.version
            )));
        }

        stored.notes = booking.notes.clone();
        stored.status = booking.status;
        stored.listener_confirmed = booking.listener_confirmed;
        stored.artist_confirmed = booking.artist_confirmed;
        stored.listener_final_confirmed = booking.listener_final_confirmed;
        stored.artist_final_confirmed = booking.artist_final_confirmed;
        stored.payment_done = booking.payment_done;
        stored.cancelled_by = booking.cancelled_by;
        stored.version += 1;
        stored.updated_at = Utc::now();

        Ok(stored.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::booking::{EventDetails, NewBookingParams};
    use assert_matches::assert_matches;
    use chrono::{NaiveDate, NaiveTime};

    fn booking(listener: &str, artist: &str) -> Booking {
        Booking::new(NewBookingParams {
            listener_id: listener.into(),
            artist_id: artist.into(),
            details: EventDetails {
                event_type: "festival".into(),
                event_date: NaiveDate::from_ymd_opt(2025, 7, 4).unwrap(),
                event_time: NaiveTime::from_hms_opt(21, 0, 0).unwrap(),
                duration_hours: 1,
                location: "Braga".into(),
                notes: None,
            },
            hourly_rate: None,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_update_bumps_version_and_rejects_stale_writes() {
        let repo = MemoryBookingRepo::new();
        let created = repo.create(&booking("l", "a")).await.unwrap();

        let mut first = created.clone();
        first.artist_confirmed = true;
        let saved = repo.update_atomic(&first).await.unwrap();
        assert_eq!(saved.version, created.version + 1);
        assert!(saved.artist_confirmed);

        let mut stale = created.clone();
        stale.status = BookingStatus::Incomplete;
        assert_matches!(repo.update_atomic(&stale).await, Err(AppError::WriteConflict(_)));

        let current = repo.find_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(current.status, BookingStatus::WaitingConfirmation);
        assert!(current.artist_confirmed);
    }

    #[tokio::test]
    async fn test_update_never_touches_price() {
        let repo = MemoryBookingRepo::new();
        let created = repo.create(&booking("l", "a")).await.unwrap();

        let mut tampered = created.clone();
        tampered.total_price = 999;
        let saved = repo.update_atomic(&tampered).await.unwrap();
        assert_eq!(saved.total_price, created.total_price);
    }

    #[tokio::test]
    async fn test_update_of_unknown_booking_is_not_found() {
        let repo = MemoryBookingRepo::new();
        assert_matches!(repo.update_atomic(&booking("l", "a")).await, Err(AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_for_party_filters_by_party_and_status() {
        let repo = MemoryBookingRepo::new();
        repo.create(&booking("l1", "a1")).await.unwrap();
        repo.create(&booking("l2", "a1")).await.unwrap();
        let other = repo.create(&booking("l2", "a2")).await.unwrap();

        assert_eq!(repo.list_for_party("a1", None).await.unwrap().len(), 2);
        assert_eq!(repo.list_for_party("l2", None).await.unwrap().len(), 2);
        assert!(repo.list_for_party("nobody", None).await.unwrap().is_empty());

        let mut cancelled = other.clone();
        cancelled.status = BookingStatus::Cancelled;
        cancelled.cancelled_by = Some(crate::domain::models::booking::PartyRole::Listener);
        repo.update_atomic(&cancelled).await.unwrap();

        let only_cancelled = repo.list_for_party("l2", Some(BookingStatus::Cancelled)).await.unwrap();
        assert_eq!(only_cancelled.len(), 1);
        assert_eq!(only_cancelled[0].id, other.id);
    }
}
