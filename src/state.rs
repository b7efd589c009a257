use std::sync::Arc;

use crate::config::Config;
use crate::domain::ports::{ArtistPricingRepository, BookingRepository};
use crate::domain::services::lifecycle::BookingLifecycle;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub booking_repo: Arc<dyn BookingRepository>,
    pub artist_repo: Arc<dyn ArtistPricingRepository>,
    pub lifecycle: Arc<BookingLifecycle>,
}

impl AppState {
    pub fn new(
        config: Config,
        booking_repo: Arc<dyn BookingRepository>,
        artist_repo: Arc<dyn ArtistPricingRepository>,
    ) -> Self {
        let lifecycle = Arc::new(BookingLifecycle::new(
            booking_repo.clone(),
            artist_repo.clone(),
            (&config).into(),
        ));
        Self {
            config,
            booking_repo,
            artist_repo,
            lifecycle,
        }
    }
}
