use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::domain::models::booking::{Booking, BookingStatus, EventDetails, NewBookingParams};
use crate::domain::ports::{ArtistPricingRepository, BookingRepository};
use crate::domain::services::transitions::{apply_transition, check_invariants, resolve_role, Command};
use crate::error::AppError;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Doubles per attempt: base, 2x base, 4x base...
    fn delay(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            base_delay: Duration::from_millis(10),
        }
    }
}

impl From<&Config> for RetryPolicy {
    fn from(config: &Config) -> Self {
        Self {
            max_retries: config.write_conflict_retries,
            base_delay: config.write_conflict_backoff,
        }
    }
}

/// Drives bookings through their negotiation lifecycle.
///
/// Every transition is a read, a pure table lookup and a compare-and-swap
/// write. When the write loses a race the booking is re-read and the whole
/// transition re-evaluated, so concurrent confirmations by the two parties
/// both land.
pub struct BookingLifecycle {
    bookings: Arc<dyn BookingRepository>,
    artists: Arc<dyn ArtistPricingRepository>,
    retry: RetryPolicy,
}

impl BookingLifecycle {
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        artists: Arc<dyn ArtistPricingRepository>,
        retry: RetryPolicy,
    ) -> Self {
        Self { bookings, artists, retry }
    }

    #[tracing::instrument(skip(self, details), fields(event_type = %details.event_type))]
    pub async fn create(&self, listener_id: &str, artist_id: &str, details: EventDetails) -> Result<Booking, AppError> {
        let pricing = self.artists.find_pricing(artist_id).await?;
        if pricing.is_none() {
            debug!(artist_id, "No pricing profile for artist, booking at rate 0");
        }

        let booking = Booking::new(NewBookingParams {
            listener_id: listener_id.to_string(),
            artist_id: artist_id.to_string(),
            details,
            hourly_rate: pricing.and_then(|p| p.hourly_rate),
        })?;

        let created = self.bookings.create(&booking).await?;
        info!(
            booking_id = %created.id,
            total_price = created.total_price,
            status = %created.status,
            "Booking requested"
        );
        Ok(created)
    }

    pub async fn confirm(&self, booking_id: &str, actor: &str) -> Result<Booking, AppError> {
        self.execute(booking_id, actor, Command::Confirm).await
    }

    /// Artist-only shortcut into `waiting_payment`. Kept alongside `confirm`
    /// because clients call both; it relies on the listener having confirmed
    /// at creation.
    pub async fn accept(&self, booking_id: &str, actor: &str) -> Result<Booking, AppError> {
        self.execute(booking_id, actor, Command::Accept).await
    }

    pub async fn reject(&self, booking_id: &str, actor: &str) -> Result<Booking, AppError> {
        self.execute(booking_id, actor, Command::Reject).await
    }

    pub async fn pay(&self, booking_id: &str, actor: &str) -> Result<Booking, AppError> {
        self.execute(booking_id, actor, Command::Pay).await
    }

    pub async fn final_confirm(&self, booking_id: &str, actor: &str) -> Result<Booking, AppError> {
        self.execute(booking_id, actor, Command::FinalConfirm).await
    }

    pub async fn cancel(&self, booking_id: &str, actor: &str, reason: Option<String>) -> Result<Booking, AppError> {
        self.execute(booking_id, actor, Command::Cancel { reason }).await
    }

    pub async fn mark_incomplete(&self, booking_id: &str, actor: &str) -> Result<Booking, AppError> {
        self.execute(booking_id, actor, Command::MarkIncomplete).await
    }

    #[tracing::instrument(skip(self, command), fields(operation = %command.operation()))]
    pub async fn execute(&self, booking_id: &str, actor: &str, command: Command) -> Result<Booking, AppError> {
        let operation = command.operation();
        let mut attempt = 0;

        loop {
            let current = self.load(booking_id).await?;
            let role = resolve_role(&current, actor)?;

            let mut next = current.clone();
            apply_transition(&mut next, role, &command)
                .map_err(|violation| violation.into_error(operation, current.status, role))?;
            check_invariants(&next)?;

            if next == current {
                debug!(booking_id, "Transition changed nothing, skipping write");
                return Ok(current);
            }

            match self.bookings.update_atomic(&next).await {
                Ok(saved) => {
                    info!(
                        booking_id,
                        %role,
                        from = %current.status,
                        to = %saved.status,
                        version = saved.version,
                        "Booking transition applied"
                    );
                    return Ok(saved);
                }
                Err(e) if e.is_transient() && attempt < self.retry.max_retries => {
                    attempt += 1;
                    let delay = self.retry.delay(attempt);
                    warn!(
                        booking_id,
                        attempt,
                        max_retries = self.retry.max_retries,
                        "Booking changed concurrently, retrying in {delay:?}"
                    );
                    sleep(delay).await;
                }
                Err(e) => {
                    if e.is_transient() {
                        warn!(booking_id, attempts = attempt + 1, "Giving up after repeated write conflicts");
                    }
                    return Err(e);
                }
            }
        }
    }

    /// A booking as seen by one of its parties.
    pub async fn get(&self, booking_id: &str, actor: &str) -> Result<Booking, AppError> {
        let booking = self.load(booking_id).await?;
        resolve_role(&booking, actor)?;
        Ok(booking)
    }

    pub async fn list_for_party(&self, actor: &str, status: Option<BookingStatus>) -> Result<Vec<Booking>, AppError> {
        let bookings = self.bookings.list_for_party(actor, status).await?;
        debug!(actor, count = bookings.len(), "Listed bookings");
        Ok(bookings)
    }

    async fn load(&self, booking_id: &str) -> Result<Booking, AppError> {
        let booking = self
            .bookings
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found".into()))?;
        debug!(booking_id, version = booking.version, status = %booking.status, "Loaded booking");
        Ok(booking)
    }
}
