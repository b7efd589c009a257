use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Pricing projection of an artist profile, read when a booking is priced.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone, PartialEq)]
pub struct ArtistPricing {
    #[sqlx(rename = "user_id")]
    pub artist_id: String,
    #[sqlx(rename = "min_price")]
    pub hourly_rate: Option<i64>,
}

impl ArtistPricing {
    pub fn new(artist_id: impl Into<String>, hourly_rate: Option<i64>) -> Self {
        Self {
            artist_id: artist_id.into(),
            hourly_rate,
        }
    }
}
