use std::collections::HashMap;

use crate::domain::{models::artist::ArtistPricing, ports::ArtistPricingRepository};
use crate::error::AppError;
use async_trait::async_trait;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct MemoryArtistPricingRepo {
    artists: RwLock<HashMap<String, ArtistPricing>>,
}

impl MemoryArtistPricingRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the artist, or replaces their rate if already known.
    pub async fn upsert(&self, pricing: ArtistPricing) {
        self.artists.write().await.insert(pricing.artist_id.clone(), pricing);
    }
}

#[async_trait]
impl ArtistPricingRepository for MemoryArtistPricingRepo {
    async fn find_pricing(&self, artist_id: &str) -> Result<Option<ArtistPricing>, AppError> {
        Ok(self.artists.read().await.get(artist_id).cloned())
    }
}
