use crate::domain::{models::booking::{Booking, BookingStatus}, ports::BookingRepository};
use crate::error::AppError;
use crate::infra::repositories::booking_row::{into_bookings, BookingRow};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::warn;

pub struct SqliteBookingRepo {
    pool: SqlitePool,
}

impl SqliteBookingRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingRepository for SqliteBookingRepo {
    async fn create(&self, booking: &Booking) -> Result<Booking, AppError> {
        let row = sqlx::query_as::<_, BookingRow>(
            "INSERT INTO bookings (id, artist_id, listener_id, event_type, event_date, event_time, duration_hours, location, notes, status, listener_confirmed, artist_confirmed, listener_final_confirmed, artist_final_confirmed, payment_done, cancelled_by, total_price, version, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
            .bind(&booking.id).bind(&booking.artist_id).bind(&booking.listener_id).bind(&booking.event_type)
            .bind(booking.event_date).bind(booking.event_time).bind(booking.duration_hours).bind(&booking.location)
            .bind(&booking.notes).bind(booking.status.as_str()).bind(booking.listener_confirmed).bind(booking.artist_confirmed)
            .bind(booking.listener_final_confirmed).bind(booking.artist_final_confirmed).bind(booking.payment_done)
            .bind(booking.cancelled_by.map(|r| r.as_str())).bind(booking.total_price).bind(booking.version)
            .bind(booking.created_at).bind(booking.updated_at)
            .fetch_one(&self.pool).await?;
        row.try_into()
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, BookingRow>("SELECT * FROM bookings WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool).await?
            .map(Booking::try_from)
            .transpose()
    }

    async fn list_for_party(&self, user_id: &str, status: Option<BookingStatus>) -> Result<Vec<Booking>, AppError> {
        let status = status.map(|s| s.as_str());
        let rows = sqlx::query_as::<_, BookingRow>(
            "SELECT * FROM bookings WHERE (artist_id = ? OR listener_id = ?) AND (? IS NULL OR status = ?) ORDER BY created_at DESC"
        )
            .bind(user_id).bind(user_id).bind(status).bind(status)
            .fetch_all(&self.pool).await?;
        into_bookings(rows)
    }

    async fn update_atomic(&self, booking: &Booking) -> Result<Booking, AppError> {
        let updated = sqlx::query_as::<_, BookingRow>(
            "UPDATE bookings SET notes=?, status=?, listener_confirmed=?, artist_confirmed=?, listener_final_confirmed=?, artist_final_confirmed=?, payment_done=?, cancelled_by=?, version=version + 1, updated_at=?
             WHERE id=? AND version=?
             RETURNING *"
        )
            .bind(&booking.notes).bind(booking.status.as_str()).bind(booking.listener_confirmed).bind(booking.artist_confirmed)
            .bind(booking.listener_final_confirmed).bind(booking.artist_final_confirmed).bind(booking.payment_done)
            .bind(booking.cancelled_by.map(|r| r.as_str())).bind(Utc::now())
            .bind(&booking.id).bind(booking.version)
            .fetch_optional(&self.pool).await?;

        match updated {
            Some(row) => row.try_into(),
            None => {
                let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM bookings WHERE id = ?")
                    .bind(&booking.id)
                    .fetch_one(&self.pool).await?;
                if exists == 0 {
                    return Err(AppError::NotFound("Booking not found".into()));
                }
                warn!(booking_id = %booking.id, version = booking.version, "Stale booking version on update");
                Err(AppError::WriteConflict(format!("booking {} changed since version {}", booking.id, booking.version)))
            }
        }
    }
}
