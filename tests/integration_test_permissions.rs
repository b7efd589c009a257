mod common;

use assert_matches::assert_matches;
use common::{event, TestApp, ARTIST, LISTENER, STRANGER};
use gig_booking::domain::models::booking::BookingStatus;
use gig_booking::domain::services::transitions::Command;
use gig_booking::error::AppError;

fn every_command() -> Vec<Command> {
    vec![
        Command::Confirm,
        Command::Accept,
        Command::Reject,
        Command::Pay,
        Command::FinalConfirm,
        Command::Cancel { reason: Some("not mine".to_string()) },
        Command::MarkIncomplete,
    ]
}

#[tokio::test]
async fn test_stranger_cannot_touch_booking() {
    let app = TestApp::new().await;
    app.seed_artist(ARTIST, Some(300)).await;
    let lifecycle = app.lifecycle();
    let booking = lifecycle.create(LISTENER, ARTIST, event(2)).await.unwrap();

    for command in every_command() {
        let result = lifecycle.execute(&booking.id, STRANGER, command).await;
        assert_matches!(result, Err(AppError::Forbidden(_)));
    }

    assert_matches!(lifecycle.get(&booking.id, STRANGER).await, Err(AppError::Forbidden(_)));
    assert_eq!(lifecycle.get(&booking.id, ARTIST).await.unwrap(), booking);
}

#[tokio::test]
async fn test_stranger_is_forbidden_even_on_terminal_booking() {
    let app = TestApp::new().await;
    app.seed_artist(ARTIST, Some(300)).await;
    let lifecycle = app.lifecycle();
    let booking = lifecycle.create(LISTENER, ARTIST, event(2)).await.unwrap();
    lifecycle.reject(&booking.id, ARTIST).await.unwrap();

    assert_matches!(lifecycle.cancel(&booking.id, STRANGER, None).await, Err(AppError::Forbidden(_)));
}

#[tokio::test]
async fn test_listener_cannot_accept_or_reject() {
    let app = TestApp::new().await;
    app.seed_artist(ARTIST, Some(300)).await;
    let lifecycle = app.lifecycle();
    let booking = lifecycle.create(LISTENER, ARTIST, event(2)).await.unwrap();

    assert_matches!(lifecycle.accept(&booking.id, LISTENER).await, Err(AppError::Forbidden(_)));
    assert_matches!(lifecycle.reject(&booking.id, LISTENER).await, Err(AppError::Forbidden(_)));

    let stored = lifecycle.get(&booking.id, LISTENER).await.unwrap();
    assert_eq!(stored.status, BookingStatus::WaitingConfirmation);
    assert_eq!(stored.version, 1);
}

#[tokio::test]
async fn test_artist_cannot_pay() {
    let app = TestApp::new().await;
    app.seed_artist(ARTIST, Some(300)).await;
    let lifecycle = app.lifecycle();
    let booking = lifecycle.create(LISTENER, ARTIST, event(2)).await.unwrap();
    lifecycle.accept(&booking.id, ARTIST).await.unwrap();

    assert_matches!(lifecycle.pay(&booking.id, ARTIST).await, Err(AppError::Forbidden(_)));

    let stored = lifecycle.get(&booking.id, ARTIST).await.unwrap();
    assert_eq!(stored.status, BookingStatus::WaitingPayment);
    assert!(!stored.payment_done);
}

#[tokio::test]
async fn test_role_is_checked_before_status() {
    let app = TestApp::new().await;
    app.seed_artist(ARTIST, Some(300)).await;
    let lifecycle = app.lifecycle();
    let booking = lifecycle.create(LISTENER, ARTIST, event(2)).await.unwrap();

    // Wrong status and wrong role at once.
    assert_matches!(lifecycle.pay(&booking.id, ARTIST).await, Err(AppError::Forbidden(_)));
}
