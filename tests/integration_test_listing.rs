mod common;

use common::{event, TestApp, ARTIST, LISTENER, STRANGER};
use gig_booking::domain::models::booking::BookingStatus;
use std::time::Duration;

#[tokio::test]
async fn test_list_returns_bookings_for_either_role_newest_first() {
    let app = TestApp::new().await;
    app.seed_artist(ARTIST, Some(100)).await;
    app.seed_artist("artist-2", Some(200)).await;
    let lifecycle = app.lifecycle();

    let first = lifecycle.create(LISTENER, ARTIST, event(1)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    let second = lifecycle.create(LISTENER, "artist-2", event(1)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    // ARTIST acting as a listener for someone else.
    let third = lifecycle.create(ARTIST, "artist-2", event(1)).await.unwrap();

    let listener_view: Vec<_> = lifecycle
        .list_for_party(LISTENER, None)
        .await
        .unwrap()
        .into_iter()
        .map(|b| b.id)
        .collect();
    assert_eq!(listener_view, vec![second.id.clone(), first.id.clone()]);

    let artist_view: Vec<_> = lifecycle
        .list_for_party(ARTIST, None)
        .await
        .unwrap()
        .into_iter()
        .map(|b| b.id)
        .collect();
    assert_eq!(artist_view, vec![third.id.clone(), first.id.clone()]);

    let artist2_view = lifecycle.list_for_party("artist-2", None).await.unwrap();
    assert_eq!(artist2_view.len(), 2);

    assert!(lifecycle.list_for_party(STRANGER, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_filters_by_status() {
    let app = TestApp::new().await;
    app.seed_artist(ARTIST, Some(100)).await;
    let lifecycle = app.lifecycle();

    let open = lifecycle.create(LISTENER, ARTIST, event(1)).await.unwrap();
    let accepted = lifecycle.create(LISTENER, ARTIST, event(2)).await.unwrap();
    lifecycle.accept(&accepted.id, ARTIST).await.unwrap();
    let cancelled = lifecycle.create(LISTENER, ARTIST, event(3)).await.unwrap();
    lifecycle.cancel(&cancelled.id, LISTENER, None).await.unwrap();

    let waiting = lifecycle
        .list_for_party(LISTENER, Some(BookingStatus::WaitingConfirmation))
        .await
        .unwrap();
    assert_eq!(waiting.len(), 1);
    assert_eq!(waiting[0].id, open.id);

    let payable = lifecycle
        .list_for_party(ARTIST, Some(BookingStatus::WaitingPayment))
        .await
        .unwrap();
    assert_eq!(payable.len(), 1);
    assert_eq!(payable[0].id, accepted.id);

    let gone = lifecycle
        .list_for_party(ARTIST, Some(BookingStatus::Cancelled))
        .await
        .unwrap();
    assert_eq!(gone.len(), 1);
    assert_eq!(gone[0].status, BookingStatus::Cancelled);

    assert!(lifecycle
        .list_for_party(LISTENER, Some(BookingStatus::Completed))
        .await
        .unwrap()
        .is_empty());
    assert_eq!(lifecycle.list_for_party(LISTENER, None).await.unwrap().len(), 3);
}
