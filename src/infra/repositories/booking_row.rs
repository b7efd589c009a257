use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::FromRow;

use crate::domain::models::booking::{Booking, BookingStatus, PartyRole};
use crate::error::AppError;

/// Column-for-column image of the `bookings` table. Status and role are kept
/// as text in the database and parsed on the way out.
#[derive(Debug, FromRow)]
pub struct BookingRow {
    pub id: String,
    pub artist_id: String,
    pub listener_id: String,
    pub event_type: String,
    pub event_date: NaiveDate,
    pub event_time: NaiveTime,
    pub duration_hours: i32,
    pub location: String,
    pub notes: Option<String>,
    pub status: String,
    pub listener_confirmed: bool,
    pub artist_confirmed: bool,
    pub listener_final_confirmed: bool,
    pub artist_final_confirmed: bool,
    pub payment_done: bool,
    pub cancelled_by: Option<String>,
    pub total_price: i64,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = AppError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<BookingStatus>()
            .map_err(|_| AppError::corrupt_row(format!("booking {} has status {:?}", row.id, row.status)))?;
        let cancelled_by = row
            .cancelled_by
            .as_deref()
            .map(str::parse::<PartyRole>)
            .transpose()
            .map_err(|_| AppError::corrupt_row(format!("booking {} has cancelled_by {:?}", row.id, row.cancelled_by)))?;

        Ok(Booking {
            id: row.id,
            artist_id: row.artist_id,
            listener_id: row.listener_id,
            event_type: row.event_type,
            event_date: row.event_date,
            event_time: row.event_time,
            duration_hours: row.duration_hours,
            location: row.location,
            notes: row.notes,
            status,
            listener_confirmed: row.listener_confirmed,
            artist_confirmed: row.artist_confirmed,
            listener_final_confirmed: row.listener_final_confirmed,
            artist_final_confirmed: row.artist_final_confirmed,
            payment_done: row.payment_done,
            cancelled_by,
            total_price: row.total_price,
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub fn into_bookings(rows: Vec<BookingRow>) -> Result<Vec<Booking>, AppError> {
    rows.into_iter().map(Booking::try_from).collect()
}
