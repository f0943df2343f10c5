//! Booking workflow tests
//!
//! Property-based and scenario tests for:
//! - Property 1: At most one pending or confirmed booking per slot occurrence
//! - Property 2: Rejection releases the slot
//! - Property 3: Decided bookings are immutable
//! - Property 4: Availability agrees with the booking set

mod common;

use std::sync::atomic::Ordering;

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{BookingStatus, Decision, Weekday};

use common::*;
use turf_booking_backend::error::AppError;
use turf_booking_backend::services::booking::{AvailabilityQuery, ListBookingsQuery};

// 2030-01-07 is a Monday
const MONDAY: &str = "2030-01-07";

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn week_of(start: &str) -> AvailabilityQuery {
    let from = date(start);
    AvailabilityQuery {
        from: Some(from),
        to: Some(from + chrono::Duration::days(6)),
    }
}

fn assert_validation(err: AppError, expected: &str) {
    match err {
        AppError::Validation { field, .. } => assert_eq!(field, expected),
        other => panic!("expected validation error on {}, got {:?}", expected, other),
    }
}

// ============================================================================
// Example Scenarios
// ============================================================================

#[tokio::test]
async fn test_fresh_turf_shows_free_slot() {
    let app = TestApp::new();
    let (_, turf) = app.owner_with_turf("o1", monday_evening()).await;

    let availability = app
        .bookings()
        .availability(turf.id, week_of(MONDAY))
        .await
        .unwrap();

    assert_eq!(availability.slots.len(), 1);
    let slot = &availability.slots[0];
    assert_eq!(slot.day, Weekday::Monday);
    assert_eq!(slot.start_time.to_string(), "18:00");
    assert_eq!(slot.end_time.to_string(), "19:00");
    assert!(!slot.is_booked);
}

#[tokio::test]
async fn test_second_request_for_held_slot_conflicts() {
    let app = TestApp::new();
    let (_, turf) = app.owner_with_turf("o1", monday_evening()).await;
    let c1 = app.customer("c1").await;
    let c2 = app.customer("c2").await;

    let first = app
        .bookings()
        .create_booking(&c1, booking_input(&turf, MONDAY, "18:00", "19:00"))
        .await
        .unwrap();
    assert_eq!(first.booking.status, BookingStatus::Pending);
    assert_eq!(first.booking.slot.day, Weekday::Monday);

    let err = app
        .bookings()
        .create_booking(&c2, booking_input(&turf, MONDAY, "18:00", "19:00"))
        .await
        .unwrap_err();
    match err {
        AppError::Conflict { resource, message } => {
            assert_eq!(resource, "slot");
            assert_eq!(message, "slot no longer available");
        }
        other => panic!("expected conflict, got {:?}", other),
    }

    let availability = app
        .bookings()
        .availability(turf.id, week_of(MONDAY))
        .await
        .unwrap();
    assert!(availability.slots[0].is_booked);
}

#[tokio::test]
async fn test_rejection_releases_slot() {
    let app = TestApp::new();
    let (owner, turf) = app.owner_with_turf("o1", monday_evening()).await;
    let c1 = app.customer("c1").await;
    let c2 = app.customer("c2").await;

    let first = app
        .bookings()
        .create_booking(&c1, booking_input(&turf, MONDAY, "18:00", "19:00"))
        .await
        .unwrap();

    let rejected = app
        .bookings()
        .decide(&owner, first.booking.id, Decision::Rejected)
        .await
        .unwrap();
    assert_eq!(rejected.booking.status, BookingStatus::Rejected);

    let retry = app
        .bookings()
        .create_booking(&c2, booking_input(&turf, MONDAY, "18:00", "19:00"))
        .await
        .unwrap();
    assert_eq!(retry.booking.status, BookingStatus::Pending);
    assert_eq!(retry.booking.customer_id, "c2");
}

#[tokio::test]
async fn test_decided_booking_cannot_be_decided_again() {
    let app = TestApp::new();
    let (owner, turf) = app.owner_with_turf("o1", monday_evening()).await;
    let c2 = app.customer("c2").await;

    let booking = app
        .bookings()
        .create_booking(&c2, booking_input(&turf, MONDAY, "18:00", "19:00"))
        .await
        .unwrap();

    let confirmed = app
        .bookings()
        .decide(&owner, booking.booking.id, Decision::Confirmed)
        .await
        .unwrap();
    assert_eq!(confirmed.booking.status, BookingStatus::Confirmed);

    let err = app
        .bookings()
        .decide(&owner, booking.booking.id, Decision::Rejected)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::AlreadyProcessed));

    let stored = app
        .bookings()
        .get_booking(&owner, booking.booking.id)
        .await
        .unwrap();
    assert_eq!(stored.booking.status, BookingStatus::Confirmed);
}

// ============================================================================
// Concurrency and authorization
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_for_one_slot_admit_exactly_one() {
    let app = TestApp::new();
    let (_, turf) = app.owner_with_turf("o1", monday_evening()).await;

    let mut handles = Vec::new();
    for i in 0..8 {
        let customer = app.customer(&format!("racer{}", i)).await;
        let service = app.bookings();
        let input = booking_input(&turf, MONDAY, "18:00", "19:00");
        handles.push(tokio::spawn(async move {
            service.create_booking(&customer, input).await
        }));
    }

    let mut won = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => won += 1,
            Err(AppError::Conflict { .. }) => conflicts += 1,
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }

    assert_eq!(won, 1);
    assert_eq!(conflicts, 7);
}

#[tokio::test]
async fn test_only_the_turf_owner_decides() {
    let app = TestApp::new();
    let (_, turf) = app.owner_with_turf("o1", monday_evening()).await;
    let (other_owner, _) = app.owner_with_turf("o2", monday_evening()).await;
    let customer = app.customer("c1").await;

    let booking = app
        .bookings()
        .create_booking(&customer, booking_input(&turf, MONDAY, "18:00", "19:00"))
        .await
        .unwrap();

    let err = app
        .bookings()
        .decide(&other_owner, booking.booking.id, Decision::Confirmed)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let err = app
        .bookings()
        .decide(&customer, booking.booking.id, Decision::Confirmed)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let err = app
        .bookings()
        .get_booking(&other_owner, booking.booking.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
async fn test_unknown_booking_is_not_found() {
    let app = TestApp::new();
    let (owner, _) = app.owner_with_turf("o1", monday_evening()).await;

    let err = app
        .bookings()
        .decide(&owner, uuid::Uuid::new_v4(), Decision::Confirmed)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_owners_cannot_book() {
    let app = TestApp::new();
    let (_, turf) = app.owner_with_turf("o1", monday_evening()).await;
    let other_owner = app.owner("o2", monday_evening()).await;

    let err = app
        .bookings()
        .create_booking(&other_owner, booking_input(&turf, MONDAY, "18:00", "19:00"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}

// ============================================================================
// Request validation
// ============================================================================

#[tokio::test]
async fn test_booking_request_validation() {
    let app = TestApp::new();
    let (_, turf) = app.owner_with_turf("o1", monday_evening()).await;
    let customer = app.customer("c1").await;
    let service = app.bookings();

    // Not one of the turf's templates
    let err = service
        .create_booking(&customer, booking_input(&turf, MONDAY, "19:00", "20:00"))
        .await
        .unwrap_err();
    assert_validation(err, "slot");

    // Tuesday has no slots
    let err = service
        .create_booking(&customer, booking_input(&turf, "2030-01-08", "18:00", "19:00"))
        .await
        .unwrap_err();
    assert_validation(err, "slot");

    let err = service
        .create_booking(&customer, booking_input(&turf, "2020-01-06", "18:00", "19:00"))
        .await
        .unwrap_err();
    assert_validation(err, "date");

    let mut wrong_day = booking_input(&turf, MONDAY, "18:00", "19:00");
    wrong_day.slot.day = Some("Friday".into());
    let err = service.create_booking(&customer, wrong_day).await.unwrap_err();
    assert_validation(err, "day");

    let mut zero = booking_input(&turf, MONDAY, "18:00", "19:00");
    zero.amount = Some(Decimal::ZERO);
    let err = service.create_booking(&customer, zero).await.unwrap_err();
    assert_validation(err, "amount");

    let mut fractional = booking_input(&turf, MONDAY, "18:00", "19:00");
    fractional.amount = Some(Decimal::new(800555, 3));
    let err = service.create_booking(&customer, fractional).await.unwrap_err();
    assert_validation(err, "amount");

    let mut no_proof = booking_input(&turf, MONDAY, "18:00", "19:00");
    no_proof.payment_proof = None;
    let err = service.create_booking(&customer, no_proof).await.unwrap_err();
    assert_validation(err, "payment_proof");

    let mut pdf = booking_input(&turf, MONDAY, "18:00", "19:00");
    if let Some(proof) = pdf.payment_proof.as_mut() {
        proof.content_type = "application/pdf".into();
    }
    let err = service.create_booking(&customer, pdf).await.unwrap_err();
    assert_validation(err, "payment_proof");

    let mut wrong_owner = booking_input(&turf, MONDAY, "18:00", "19:00");
    wrong_owner.owner_id = Some("someone-else".into());
    let err = service.create_booking(&customer, wrong_owner).await.unwrap_err();
    assert_validation(err, "owner_id");

    // Nothing was stored along the way
    assert_eq!(app.media.uploads.load(Ordering::SeqCst), 0);
    let mine = service
        .list_for_customer(&customer, ListBookingsQuery::default())
        .await
        .unwrap();
    assert_eq!(mine.pagination.total_items, 0);
}

#[tokio::test]
async fn test_inactive_turf_refuses_bookings() {
    let app = TestApp::new();
    let (owner, turf) = app.owner_with_turf("o1", monday_evening()).await;
    let customer = app.customer("c1").await;

    app.turfs()
        .update_turf(
            &owner,
            turf.id,
            turf_booking_backend::services::turf::UpdateTurfInput {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let err = app
        .bookings()
        .create_booking(&customer, booking_input(&turf, MONDAY, "18:00", "19:00"))
        .await
        .unwrap_err();
    assert_validation(err, "turf_id");
}

#[tokio::test]
async fn test_failed_proof_upload_creates_nothing() {
    let app = TestApp::new();
    let (_, turf) = app.owner_with_turf("o1", monday_evening()).await;
    let customer = app.customer("c1").await;
    app.media.fail.store(true, Ordering::SeqCst);

    let err = app
        .bookings()
        .create_booking(&customer, booking_input(&turf, MONDAY, "18:00", "19:00"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Upstream { .. }));

    let availability = app
        .bookings()
        .availability(turf.id, week_of(MONDAY))
        .await
        .unwrap();
    assert!(!availability.slots[0].is_booked);

    // Retry once the host recovers
    app.media.fail.store(false, Ordering::SeqCst);
    let booking = app
        .bookings()
        .create_booking(&customer, booking_input(&turf, MONDAY, "18:00", "19:00"))
        .await
        .unwrap();
    assert!(booking.booking.payment_proof.url.contains("payment-proofs"));
}

// ============================================================================
// Listings
// ============================================================================

#[tokio::test]
async fn test_party_listings_filter_by_status() {
    let app = TestApp::new();
    let slots = vec![
        template(Weekday::Monday, "18:00", "19:00"),
        template(Weekday::Monday, "19:00", "20:00"),
        template(Weekday::Monday, "20:00", "21:00"),
    ];
    let (owner, turf) = app.owner_with_turf("o1", slots).await;
    let customer = app.customer("c1").await;
    let service = app.bookings();

    let mut ids = Vec::new();
    for (start, end) in [("18:00", "19:00"), ("19:00", "20:00"), ("20:00", "21:00")] {
        let b = service
            .create_booking(&customer, booking_input(&turf, MONDAY, start, end))
            .await
            .unwrap();
        ids.push(b.booking.id);
    }
    service
        .decide(&owner, ids[0], Decision::Confirmed)
        .await
        .unwrap();

    let pending = service
        .list_for_owner(
            &owner,
            ListBookingsQuery {
                status: Some("pending".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(pending.pagination.total_items, 2);
    assert!(pending
        .data
        .iter()
        .all(|b| b.booking.status == BookingStatus::Pending));
    assert!(pending.data.iter().all(|b| b.turf.is_some() && b.customer.is_some()));

    let page = service
        .list_for_customer(
            &customer,
            ListBookingsQuery {
                page: Some(2),
                page_size: Some(2),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(page.pagination.total_items, 3);
    assert_eq!(page.pagination.total_pages, 2);
    assert_eq!(page.data.len(), 1);

    let err = service
        .list_for_owner(
            &owner,
            ListBookingsQuery {
                status: Some("cancelled".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_validation(err, "status");

    let err = service
        .list_for_owner(&customer, ListBookingsQuery::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}

// ============================================================================
// Property Tests
// ============================================================================

fn start_hours() -> impl Strategy<Value = Vec<u16>> {
    prop::collection::btree_set(6u16..22, 1..6).prop_map(|s| s.into_iter().collect())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Availability marks exactly the occurrences held by a pending or
    /// confirmed booking; rejected requests leave theirs free.
    #[test]
    fn prop_availability_matches_bookings(
        hours in start_hours(),
        picks in prop::collection::vec((any::<bool>(), any::<bool>()), 6),
    ) {
        tokio_test::block_on(async {
            let app = TestApp::new();
            let slots: Vec<_> = hours
                .iter()
                .map(|h| {
                    template(
                        Weekday::Monday,
                        &format!("{:02}:00", h),
                        &format!("{:02}:00", h + 1),
                    )
                })
                .collect();
            let (owner, turf) = app.owner_with_turf("o1", slots).await;
            let customer = app.customer("c1").await;
            let service = app.bookings();

            let mut expected_booked = Vec::new();
            for (h, (book, reject)) in hours.iter().zip(picks.iter()) {
                let start = format!("{:02}:00", h);
                if !book {
                    continue;
                }
                let booking = service
                    .create_booking(
                        &customer,
                        booking_input(&turf, MONDAY, &start, &format!("{:02}:00", h + 1)),
                    )
                    .await
                    .unwrap();
                if *reject {
                    service
                        .decide(&owner, booking.booking.id, Decision::Rejected)
                        .await
                        .unwrap();
                } else {
                    expected_booked.push(start);
                }
            }

            let availability = service
                .availability(turf.id, week_of(MONDAY))
                .await
                .unwrap();
            prop_assert_eq!(availability.slots.len(), hours.len());
            for slot in &availability.slots {
                let start = slot.start_time.to_string();
                prop_assert_eq!(slot.is_booked, expected_booked.contains(&start));
            }
            Ok(())
        })?;
    }
}
