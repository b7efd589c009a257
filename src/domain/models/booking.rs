use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    WaitingConfirmation,
    WaitingPayment,
    WaitingFinalConfirmation,
    Completed,
    Cancelled,
    Incomplete,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 6] = [
        BookingStatus::WaitingConfirmation,
        BookingStatus::WaitingPayment,
        BookingStatus::WaitingFinalConfirmation,
        BookingStatus::Completed,
        BookingStatus::Cancelled,
        BookingStatus::Incomplete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::WaitingConfirmation => "waiting_confirmation",
            BookingStatus::WaitingPayment => "waiting_payment",
            BookingStatus::WaitingFinalConfirmation => "waiting_final_confirmation",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Incomplete => "incomplete",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BookingStatus::Completed | BookingStatus::Cancelled | BookingStatus::Incomplete
        )
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BookingStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| AppError::Validation(format!("Unknown booking status: {}", s)))
    }
}

/// Which side of the booking a user is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartyRole {
    Artist,
    Listener,
}

impl PartyRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartyRole::Artist => "artist",
            PartyRole::Listener => "listener",
        }
    }
}

impl fmt::Display for PartyRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PartyRole {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "artist" => Ok(PartyRole::Artist),
            "listener" => Ok(PartyRole::Listener),
            other => Err(AppError::Validation(format!("Unknown party role: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDetails {
    pub event_type: String,
    pub event_date: NaiveDate,
    pub event_time: NaiveTime,
    pub duration_hours: i32,
    pub location: String,
    pub notes: Option<String>,
}

impl EventDetails {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.event_type.trim().is_empty() {
            return Err(AppError::Validation("event_type is required".into()));
        }
        if self.location.trim().is_empty() {
            return Err(AppError::Validation("location is required".into()));
        }
        if self.duration_hours <= 0 {
            return Err(AppError::Validation("duration_hours must be positive".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Booking {
    pub id: String,
    pub artist_id: String,
    pub listener_id: String,
    pub event_type: String,
    pub event_date: NaiveDate,
    pub event_time: NaiveTime,
    pub duration_hours: i32,
    pub location: String,
    pub notes: Option<String>,
    pub status: BookingStatus,
    pub listener_confirmed: bool,
    pub artist_confirmed: bool,
    pub listener_final_confirmed: bool,
    pub artist_final_confirmed: bool,
    pub payment_done: bool,
    pub cancelled_by: Option<PartyRole>,
    pub total_price: i64,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct NewBookingParams {
    pub listener_id: String,
    pub artist_id: String,
    pub details: EventDetails,
    pub hourly_rate: Option<i64>,
}

impl Booking {
    /// Builds a fresh booking request. The listener is the requester, so their
    /// confirmation is recorded up front; the price is fixed here and never
    /// recomputed.
    pub fn new(params: NewBookingParams) -> Result<Self, AppError> {
        params.details.validate()?;

        if params.listener_id == params.artist_id {
            return Err(AppError::Validation("An artist cannot book themselves".into()));
        }

        let total_price = quote_total(params.hourly_rate, params.details.duration_hours)?;
        let now = Utc::now();
        let EventDetails {
            event_type,
            event_date,
            event_time,
            duration_hours,
            location,
            notes,
        } = params.details;

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            artist_id: params.artist_id,
            listener_id: params.listener_id,
            event_type,
            event_date,
            event_time,
            duration_hours,
            location,
            notes,
            status: BookingStatus::WaitingConfirmation,
            listener_confirmed: true,
            artist_confirmed: false,
            listener_final_confirmed: false,
            artist_final_confirmed: false,
            payment_done: false,
            cancelled_by: None,
            total_price,
            version: 1,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn is_party(&self, user_id: &str) -> bool {
        self.artist_id == user_id || self.listener_id == user_id
    }

    pub(crate) fn append_cancel_reason(&mut self, reason: &str) {
        let entry = format!("[Cancel Reason: {}]", reason);
        self.notes = Some(match self.notes.take() {
            Some(existing) if !existing.is_empty() => format!("{} {}", existing, entry),
            _ => entry,
        });
    }
}

/// `hourly_rate * duration_hours`; an artist without a rate books for free.
pub fn quote_total(hourly_rate: Option<i64>, duration_hours: i32) -> Result<i64, AppError> {
    hourly_rate
        .unwrap_or(0)
        .checked_mul(i64::from(duration_hours))
        .ok_or_else(|| AppError::Validation("Total price is out of range".into()))
}
