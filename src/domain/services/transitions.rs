//! The booking state machine as a pure function of
//! `(current status, operation, acting role)`.
//!
//! Nothing in here touches storage: the lifecycle service reads a booking,
//! runs it through [`apply_transition`] and persists the result.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::models::booking::{Booking, BookingStatus, PartyRole};
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Confirm,
    Accept,
    Reject,
    Pay,
    FinalConfirm,
    Cancel,
    MarkIncomplete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Confirm => "confirm",
            Operation::Accept => "accept",
            Operation::Reject => "reject",
            Operation::Pay => "pay",
            Operation::FinalConfirm => "final_confirm",
            Operation::Cancel => "cancel",
            Operation::MarkIncomplete => "mark_incomplete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An operation together with its payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum Command {
    Confirm,
    Accept,
    Reject,
    Pay,
    FinalConfirm,
    Cancel { reason: Option<String> },
    MarkIncomplete,
}

impl Command {
    pub fn operation(&self) -> Operation {
        match self {
            Command::Confirm => Operation::Confirm,
            Command::Accept => Operation::Accept,
            Command::Reject => Operation::Reject,
            Command::Pay => Operation::Pay,
            Command::FinalConfirm => Operation::FinalConfirm,
            Command::Cancel { .. } => Operation::Cancel,
            Command::MarkIncomplete => Operation::MarkIncomplete,
        }
    }
}

/// How the aggregate status moves once the flag changes are in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    To(BookingStatus),
    /// Two-party gate on `artist_confirmed && listener_confirmed`.
    WhenBothConfirmed(BookingStatus),
    /// Two-party gate on both final-confirmation flags.
    WhenBothFinalConfirmed(BookingStatus),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Effect {
    pub confirm: Option<PartyRole>,
    pub final_confirm: Option<PartyRole>,
    pub record_payment: bool,
    pub cancelled_by: Option<PartyRole>,
    pub advance: Advance,
}

impl Effect {
    fn to(status: BookingStatus) -> Self {
        Self {
            confirm: None,
            final_confirm: None,
            record_payment: false,
            cancelled_by: None,
            advance: Advance::To(status),
        }
    }

    fn confirm(role: PartyRole) -> Self {
        Self {
            confirm: Some(role),
            advance: Advance::WhenBothConfirmed(BookingStatus::WaitingPayment),
            ..Self::to(BookingStatus::WaitingConfirmation)
        }
    }

    fn pay() -> Self {
        Self {
            record_payment: true,
            ..Self::to(BookingStatus::WaitingFinalConfirmation)
        }
    }

    fn final_confirm(role: PartyRole) -> Self {
        Self {
            final_confirm: Some(role),
            advance: Advance::WhenBothFinalConfirmed(BookingStatus::Completed),
            ..Self::to(BookingStatus::WaitingFinalConfirmation)
        }
    }

    fn cancel(role: PartyRole) -> Self {
        Self {
            cancelled_by: Some(role),
            ..Self::to(BookingStatus::Cancelled)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    /// The actor is a party, but not the one this operation is reserved for.
    Role,
    /// The booking's current status does not admit this operation.
    Status,
}

impl Violation {
    pub fn into_error(self, operation: Operation, status: BookingStatus, role: PartyRole) -> AppError {
        match self {
            Violation::Role => AppError::Forbidden(format!("The {} cannot {} this booking", role, operation)),
            Violation::Status => AppError::InvalidState { operation, status },
        }
    }
}

/// Resolves which party `actor` is. Strangers are rejected before any
/// transition is considered.
pub fn resolve_role(booking: &Booking, actor: &str) -> Result<PartyRole, AppError> {
    if booking.artist_id == actor {
        Ok(PartyRole::Artist)
    } else if booking.listener_id == actor {
        Ok(PartyRole::Listener)
    } else {
        Err(AppError::Forbidden("You are not part of this booking".into()))
    }
}

pub fn transition(status: BookingStatus, operation: Operation, role: PartyRole) -> Result<Effect, Violation> {
    use BookingStatus::*;
    use Operation::*;
    use PartyRole::*;

    match (status, operation, role) {
        (_, Accept | Reject, Listener) | (_, Pay, Artist) => Err(Violation::Role),

        (WaitingConfirmation, Confirm | Accept, role) => Ok(Effect::confirm(role)),
        // Both flags are already set once payment is due; a late confirm is a no-op.
        (WaitingPayment, Confirm, role) => Ok(Effect {
            confirm: Some(role),
            ..Effect::to(WaitingPayment)
        }),
        (WaitingPayment, Pay, Listener) => Ok(Effect::pay()),
        (WaitingFinalConfirmation, FinalConfirm, role) => Ok(Effect::final_confirm(role)),

        (s, Cancel | Reject, role) if !s.is_terminal() => Ok(Effect::cancel(role)),
        (s, MarkIncomplete, _) if !s.is_terminal() => Ok(Effect::to(Incomplete)),

        _ => Err(Violation::Status),
    }
}

pub fn apply_transition(booking: &mut Booking, role: PartyRole, command: &Command) -> Result<(), Violation> {
    let effect = transition(booking.status, command.operation(), role)?;

    match effect.confirm {
        Some(PartyRole::Artist) => booking.artist_confirmed = true,
        Some(PartyRole::Listener) => booking.listener_confirmed = true,
        None => {}
    }
    match effect.final_confirm {
        Some(PartyRole::Artist) => booking.artist_final_confirmed = true,
        Some(PartyRole::Listener) => booking.listener_final_confirmed = true,
        None => {}
    }
    if effect.record_payment {
        booking.payment_done = true;
        booking.artist_final_confirmed = false;
        booking.listener_final_confirmed = false;
    }
    if let Some(by) = effect.cancelled_by {
        booking.cancelled_by = Some(by);
    }
    if let Command::Cancel { reason: Some(reason) } = command
        && !reason.trim().is_empty()
    {
        booking.append_cancel_reason(reason.trim());
    }

    booking.status = match effect.advance {
        Advance::To(next) => next,
        Advance::WhenBothConfirmed(next) if booking.artist_confirmed && booking.listener_confirmed => next,
        Advance::WhenBothFinalConfirmed(next)
            if booking.artist_final_confirmed && booking.listener_final_confirmed =>
        {
            next
        }
        Advance::WhenBothConfirmed(_) | Advance::WhenBothFinalConfirmed(_) => booking.status,
    };

    Ok(())
}

/// Structural invariants every persisted booking must satisfy.
pub fn check_invariants(booking: &Booking) -> Result<(), AppError> {
    use BookingStatus::*;

    let cancelled = booking.status == Cancelled;
    if cancelled != booking.cancelled_by.is_some() {
        return Err(AppError::internal(format!(
            "booking {}: cancelled_by must be set exactly when cancelled (status {})",
            booking.id, booking.status
        )));
    }

    let final_flags = booking.artist_final_confirmed || booking.listener_final_confirmed;
    if matches!(booking.status, WaitingConfirmation | WaitingPayment) && (final_flags || booking.payment_done) {
        return Err(AppError::internal(format!(
            "booking {}: payment or final confirmation recorded before payment step",
            booking.id
        )));
    }

    let both_confirmed = booking.artist_confirmed && booking.listener_confirmed;
    if matches!(booking.status, WaitingPayment | WaitingFinalConfirmation | Completed) && !both_confirmed {
        return Err(AppError::internal(format!(
            "booking {}: status {} reached without both confirmations",
            booking.id, booking.status
        )));
    }

    if matches!(booking.status, WaitingFinalConfirmation | Completed) && !booking.payment_done {
        return Err(AppError::internal(format!(
            "booking {}: status {} reached without payment",
            booking.id, booking.status
        )));
    }

    if booking.status == Completed && !(booking.artist_final_confirmed && booking.listener_final_confirmed) {
        return Err(AppError::internal(format!(
            "booking {}: completed without both final confirmations",
            booking.id
        )));
    }

    Ok(())
}
