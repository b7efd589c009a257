use crate::domain::{models::artist::ArtistPricing, ports::ArtistPricingRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteArtistPricingRepo {
    pool: SqlitePool,
}

impl SqliteArtistPricingRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ArtistPricingRepository for SqliteArtistPricingRepo {
    async fn find_pricing(&self, artist_id: &str) -> Result<Option<ArtistPricing>, AppError> {
        let pricing = sqlx::query_as::<_, ArtistPricing>(
            "SELECT user_id, min_price FROM artist_profiles WHERE user_id = ?"
        )
            .bind(artist_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(pricing)
    }
}
