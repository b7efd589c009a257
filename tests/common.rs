use gig_booking::{
    config::Config,
    domain::models::booking::EventDetails,
    domain::services::lifecycle::BookingLifecycle,
    infra::factory::connect_sqlite,
    state::AppState,
    infra::repositories::{
        sqlite_artist_pricing_repo::SqliteArtistPricingRepo,
        sqlite_booking_repo::SqliteBookingRepo,
    },
};
use chrono::{NaiveDate, NaiveTime};
use sqlx::{Pool, Sqlite};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

pub const ARTIST: &str = "artist-1";
pub const LISTENER: &str = "listener-1";
pub const STRANGER: &str = "stranger-1";

#[allow(dead_code)]
pub struct TestApp {
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let mut config = Config::for_database(db_url);
        config.max_connections = 8;
        config.write_conflict_retries = 20;
        config.write_conflict_backoff = Duration::from_millis(1);

        let pool = connect_sqlite(&config)
            .await
            .expect("Failed to open test db");

        let state = Arc::new(AppState::new(
            config,
            Arc::new(SqliteBookingRepo::new(pool.clone())),
            Arc::new(SqliteArtistPricingRepo::new(pool.clone())),
        ));

        Self {
            pool,
            db_filename,
            state,
        }
    }

    pub fn lifecycle(&self) -> &BookingLifecycle {
        &self.state.lifecycle
    }

    pub async fn seed_artist(&self, artist_id: &str, min_price: Option<i64>) {
        sqlx::query("INSERT INTO artist_profiles (user_id, min_price) VALUES (?, ?)")
            .bind(artist_id)
            .bind(min_price)
            .execute(&self.pool)
            .await
            .expect("Failed to seed artist");
    }

    pub async fn set_artist_rate(&self, artist_id: &str, min_price: Option<i64>) {
        sqlx::query("UPDATE artist_profiles SET min_price = ? WHERE user_id = ?")
            .bind(min_price)
            .bind(artist_id)
            .execute(&self.pool)
            .await
            .expect("Failed to update artist rate");
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_filename));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_filename));
    }
}

#[allow(dead_code)]
pub fn event(duration_hours: i32) -> EventDetails {
    EventDetails {
        event_type: "wedding".to_string(),
        event_date: NaiveDate::from_ymd_opt(2026, 6, 13).unwrap(),
        event_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
        duration_hours,
        location: "Quinta da Regaleira".to_string(),
        notes: Some("Acoustic set".to_string()),
    }
}
