//! Listing search tests
//!
//! Tests for:
//! - Property 5: Search returns only active listings matching every filter
//! - Property 6: Search ordering and pagination are stable
//! - Store outages surface as an error, never as stand-in listings

mod common;

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{
    Account, Amenity, Booking, BookingSlot, BookingStatus, ContactInfo, DateRange, Location,
    MediaRef, Pagination, Sport, Turf, TurfQueryParams, Weekday,
};
use uuid::Uuid;

use common::*;
use turf_booking_backend::error::AppError;
use turf_booking_backend::services::TurfService;
use turf_booking_backend::store::{
    AccountStore, BookingFilter, BookingStore, Store, StoreResult, TurfStore,
};
use turf_booking_backend::Config;

// ============================================================================
// Fixtures
// ============================================================================

fn listing(name: &str, sports: &[Sport], price: i64, city: &str, active: bool, age_days: i64) -> Turf {
    let created: DateTime<Utc> = Utc::now() - Duration::days(age_days);
    Turf {
        id: Uuid::new_v4(),
        owner_id: format!("owner-{}", name.to_lowercase().replace(' ', "-")),
        name: name.to_string(),
        description: format!("{} in {}", name, city),
        images: vec![MediaRef::new("https://media.test/turfs/a.jpg", "turfs/a")],
        sports: sports.to_vec(),
        custom_sport: None,
        amenities: vec![Amenity::Parking],
        slots: monday_evening(),
        price_per_hour: Decimal::from(price),
        location: Location {
            address: "1 Main Street".into(),
            city: city.into(),
            state: None,
            pincode: None,
        },
        contact: ContactInfo::default(),
        payment_qr: None,
        is_active: active,
        rating: Decimal::ZERO,
        review_count: 0,
        created_at: created,
        updated_at: created,
    }
}

/// Five listings: three active cricket turfs, one inactive cricket turf and
/// one football-only turf
async fn seeded() -> TestApp {
    let app = TestApp::new();
    let fixture = [
        listing("Boundary Box", &[Sport::Cricket], 900, "Pune", true, 1),
        listing("Night Nets", &[Sport::Cricket, Sport::Football], 500, "Mumbai", true, 2),
        listing("Square Leg", &[Sport::Cricket], 700, "Pune", true, 3),
        listing("Closed Ground", &[Sport::Cricket], 600, "Pune", false, 4),
        listing("Goal Post", &[Sport::Football], 650, "Mumbai", true, 5),
    ];
    for turf in fixture {
        app.store.insert_turf(turf).await.unwrap();
    }
    app
}

fn params(sport: &str, min: i64, max: i64, sort: &str, page: u32) -> TurfQueryParams {
    TurfQueryParams {
        sport: Some(sport.into()),
        min_price: Some(Decimal::from(min)),
        max_price: Some(Decimal::from(max)),
        sort: Some(sort.into()),
        page: Some(page),
        page_size: Some(2),
        ..Default::default()
    }
}

// ============================================================================
// Example Scenario
// ============================================================================

#[tokio::test]
async fn test_cricket_price_band_sorted_by_price() {
    let app = seeded().await;
    let service = app.turfs();

    let first = service
        .search(params("Cricket", 500, 1000, "price_low", 1))
        .await
        .unwrap();
    let names: Vec<_> = first.data.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Night Nets", "Square Leg"]);
    assert_eq!(first.pagination.total_items, 3);
    assert_eq!(first.pagination.total_pages, 2);
    assert!(first.pagination.has_next);

    let second = service
        .search(params("Cricket", 500, 1000, "price_low", 2))
        .await
        .unwrap();
    let names: Vec<_> = second.data.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Boundary Box"]);
    assert!(!second.pagination.has_next);
}

#[tokio::test]
async fn test_facets_and_filters() {
    let app = seeded().await;
    let service = app.turfs();

    let all = service.search(TurfQueryParams::default()).await.unwrap();
    assert_eq!(all.pagination.total_items, 4);
    // Newest first by default
    assert_eq!(all.data[0].name, "Boundary Box");
    assert_eq!(all.facets.cities, vec!["Mumbai".to_string(), "Pune".to_string()]);
    let cricket = all
        .facets
        .sports
        .iter()
        .find(|f| f.sport == Sport::Cricket)
        .unwrap();
    assert_eq!(cricket.count, 3);
    let range = all.facets.price_range.unwrap();
    assert_eq!(range.min, Decimal::from(500));
    assert_eq!(range.max, Decimal::from(900));

    let in_pune = service
        .search(TurfQueryParams {
            city: Some("PUNE".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(in_pune.pagination.total_items, 2);

    let by_text = service
        .search(TurfQueryParams {
            search: Some("goal".into()),
            sport: Some("all".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_text.data.len(), 1);
    assert_eq!(by_text.data[0].name, "Goal Post");
}

#[tokio::test]
async fn test_invalid_query_parameters() {
    let app = seeded().await;
    let service = app.turfs();

    let cases = [
        (
            TurfQueryParams {
                sport: Some("curling".into()),
                ..Default::default()
            },
            "sport",
        ),
        (
            TurfQueryParams {
                sort: Some("cheapest".into()),
                ..Default::default()
            },
            "sort",
        ),
        (
            TurfQueryParams {
                min_price: Some(Decimal::from(900)),
                max_price: Some(Decimal::from(100)),
                ..Default::default()
            },
            "min_price",
        ),
    ];

    for (params, expected) in cases {
        match service.search(params).await.unwrap_err() {
            AppError::Validation { field, .. } => assert_eq!(field, expected),
            other => panic!("expected validation error on {}, got {:?}", expected, other),
        }
    }
}

#[tokio::test]
async fn test_inactive_turf_visible_to_its_owner_only() {
    let app = TestApp::new();
    let (owner, turf) = app.owner_with_turf("o1", monday_evening()).await;
    let stranger = app.customer("c1").await;

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

    assert!(app.turfs().get_turf(turf.id, Some(&owner)).await.is_ok());
    assert!(matches!(
        app.turfs().get_turf(turf.id, Some(&stranger)).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        app.turfs().get_turf(turf.id, None).await,
        Err(AppError::NotFound(_))
    ));

    let found = app.turfs().search(TurfQueryParams::default()).await.unwrap();
    assert!(found.data.is_empty());
}

// ============================================================================
// Store outage
// ============================================================================

/// Store whose every call fails
struct OfflineStore;

fn offline<T>() -> StoreResult<T> {
    Err(AppError::Internal("store offline".into()))
}

#[axum::async_trait]
impl AccountStore for OfflineStore {
    async fn get_account(&self, _id: &str) -> StoreResult<Option<Account>> {
        offline()
    }
    async fn find_account_by_email(&self, _email: &str) -> StoreResult<Option<Account>> {
        offline()
    }
    async fn insert_account(&self, _account: Account) -> StoreResult<Account> {
        offline()
    }
    async fn update_account(&self, _account: Account) -> StoreResult<Account> {
        offline()
    }
}

#[axum::async_trait]
impl TurfStore for OfflineStore {
    async fn get_turf(&self, _id: Uuid) -> StoreResult<Option<Turf>> {
        offline()
    }
    async fn find_turf_by_owner(&self, _owner_id: &str) -> StoreResult<Option<Turf>> {
        offline()
    }
    async fn list_active_turfs(&self) -> StoreResult<Vec<Turf>> {
        offline()
    }
    async fn insert_turf(&self, _turf: Turf) -> StoreResult<Turf> {
        offline()
    }
    async fn update_turf(&self, _turf: Turf) -> StoreResult<Turf> {
        offline()
    }
}

#[axum::async_trait]
impl BookingStore for OfflineStore {
    async fn get_booking(&self, _id: Uuid) -> StoreResult<Option<Booking>> {
        offline()
    }
    async fn bookings_for_turf(&self, _turf_id: Uuid, _range: &DateRange) -> StoreResult<Vec<Booking>> {
        offline()
    }
    async fn find_blocking_booking(
        &self,
        _turf_id: Uuid,
        _slot: &BookingSlot,
    ) -> StoreResult<Option<Booking>> {
        offline()
    }
    async fn insert_booking(&self, _booking: Booking) -> StoreResult<Booking> {
        offline()
    }
    async fn decide_booking(
        &self,
        _id: Uuid,
        _status: BookingStatus,
        _decided_at: DateTime<Utc>,
    ) -> StoreResult<Option<Booking>> {
        offline()
    }
    async fn list_bookings(
        &self,
        _filter: &BookingFilter,
        _pagination: &Pagination,
    ) -> StoreResult<(Vec<Booking>, u64)> {
        offline()
    }
}

#[axum::async_trait]
impl Store for OfflineStore {
    async fn ping(&self) -> StoreResult<()> {
        offline()
    }
}

#[tokio::test]
async fn test_store_outage_is_reported_not_masked() {
    let service = TurfService::new(
        Arc::new(OfflineStore),
        Arc::new(Config::for_memory_store(SECRET)),
    );

    let err = service.search(TurfQueryParams::default()).await.unwrap_err();
    assert!(matches!(err, AppError::ServiceUnavailable(_)));
    assert_eq!(err.status(), axum::http::StatusCode::SERVICE_UNAVAILABLE);
}

// ============================================================================
// Property Tests
// ============================================================================

fn sport_strategy() -> impl Strategy<Value = Sport> {
    prop::sample::select(vec![
        Sport::Cricket,
        Sport::Football,
        Sport::Tennis,
        Sport::Badminton,
    ])
}

fn listing_strategy() -> impl Strategy<Value = (Sport, i64, bool, i64)> {
    (sport_strategy(), 100i64..3000, any::<bool>(), 0i64..365)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Every returned listing is active and satisfies the filters; walking
    /// all pages yields each match exactly once in ascending price order.
    #[test]
    fn prop_search_filters_and_pages(
        listings in prop::collection::vec(listing_strategy(), 0..15),
        sport in sport_strategy(),
        min in 100i64..1500,
        span in 0i64..1500,
        page_size in 1u32..5,
    ) {
        let turfs: Vec<Turf> = listings
            .iter()
            .enumerate()
            .map(|(i, (s, price, active, age))| {
                listing(&format!("Turf {}", i), &[*s], *price, "Pune", *active, *age)
            })
            .collect();
        let max = min + span;

        let expected = turfs
            .iter()
            .filter(|t| {
                t.is_active
                    && t.sports.contains(&sport)
                    && t.price_per_hour >= Decimal::from(min)
                    && t.price_per_hour <= Decimal::from(max)
            })
            .count();

        let query = TurfQueryParams {
            sport: Some(sport.as_str().to_string()),
            min_price: Some(Decimal::from(min)),
            max_price: Some(Decimal::from(max)),
            sort: Some("price_low".into()),
            page_size: Some(page_size),
            ..Default::default()
        };

        let mut seen = Vec::new();
        let mut page = 1;
        loop {
            let q = TurfQueryParams { page: Some(page), ..query.clone() }
                .into_query(12, 50)
                .unwrap();
            let result = shared::search_turfs(&turfs, &q);
            prop_assert_eq!(result.pagination.total_items as usize, expected);
            prop_assert!(result.data.len() <= page_size as usize);
            seen.extend(result.data);
            if !result.pagination.has_next {
                break;
            }
            page += 1;
        }

        prop_assert_eq!(seen.len(), expected);
        prop_assert!(seen.windows(2).all(|w| w[0].price_per_hour <= w[1].price_per_hour));
        let mut ids: Vec<_> = seen.iter().map(|t| t.id).collect();
        ids.sort();
        ids.dedup();
        prop_assert_eq!(ids.len(), expected);
        prop_assert!(seen.iter().all(|t| t.sports.contains(&sport)));
    }
}

#[test]
fn test_weekday_fixture_is_monday() {
    let d = chrono::NaiveDate::from_ymd_opt(2030, 1, 7).unwrap();
    assert_eq!(Weekday::of(d), Weekday::Monday);
}
