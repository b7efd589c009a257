use crate::domain::models::{
    artist::ArtistPricing,
    booking::{Booking, BookingStatus},
};
use crate::error::AppError;
use async_trait::async_trait;

#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn create(&self, booking: &Booking) -> Result<Booking, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError>;
    async fn list_for_party(&self, user_id: &str, status: Option<BookingStatus>) -> Result<Vec<Booking>, AppError>;
    /// Persists every mutable field of `booking` in one statement, but only if
    /// the stored version still equals `booking.version`. The returned record
    /// carries the bumped version and a fresh `updated_at`.
    ///
    /// A stale version yields [`AppError::WriteConflict`]; a vanished row
    /// yields [`AppError::NotFound`].
    async fn update_atomic(&self, booking: &Booking) -> Result<Booking, AppError>;
}

#[async_trait]
pub trait ArtistPricingRepository: Send + Sync {
    /// `None` when the artist has no pricing profile. Callers price both that
    /// case and `hourly_rate: None` at 0.
    async fn find_pricing(&self, artist_id: &str) -> Result<Option<ArtistPricing>, AppError>;
}
