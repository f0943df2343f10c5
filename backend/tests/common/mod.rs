//! Shared fixtures for the backend integration tests
//!
//! Builds an application state over the in-memory store, a stub media host
//! and HS256 identity tokens signed with a test secret.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use axum::Router;
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use rust_decimal::Decimal;
use shared::{
    Account, Amenity, Location, MediaFolder, MediaRef, SlotRequest, SlotTemplate, Sport,
    TimeOfDay, Turf, Weekday,
};

use turf_booking_backend::error::{AppError, AppResult};
use turf_booking_backend::identity::{Identity, IdentityClaims, JwtIdentityVerifier};
use turf_booking_backend::media::{MediaStore, MediaUpload};
use turf_booking_backend::services::account::OwnerProfileInput;
use turf_booking_backend::services::booking::CreateBookingInput;
use turf_booking_backend::services::turf::CreateTurfInput;
use turf_booking_backend::services::{AccountService, BookingService, TurfService};
use turf_booking_backend::store::MemoryStore;
use turf_booking_backend::{create_app, AppState, Config};

pub const SECRET: &str = "integration-test-secret";

/// Media host that records uploads and can be switched to fail
#[derive(Default)]
pub struct StubMedia {
    pub fail: AtomicBool,
    pub uploads: AtomicUsize,
}

#[axum::async_trait]
impl MediaStore for StubMedia {
    async fn upload(&self, file: MediaUpload, folder: MediaFolder) -> AppResult<MediaRef> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::upstream("media", "stub media host is down"));
        }
        let n = self.uploads.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(MediaRef::new(
            format!("https://media.test/{}/{}-{}", folder.as_str(), n, file.filename),
            format!("{}/{}", folder.as_str(), n),
        ))
    }
}

pub struct TestApp {
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub media: Arc<StubMedia>,
}

impl TestApp {
    pub fn new() -> Self {
        let config = Config::for_memory_store(SECRET);
        let identity = JwtIdentityVerifier::from_config(&config.identity).unwrap();
        let store = Arc::new(MemoryStore::new());
        let media = Arc::new(StubMedia::default());

        let state = AppState {
            store: store.clone(),
            identity: Arc::new(identity),
            media: media.clone(),
            config: Arc::new(config),
        };

        Self {
            state,
            store,
            media,
        }
    }

    pub fn router(&self) -> Router {
        create_app(self.state.clone())
    }

    pub fn accounts(&self) -> AccountService {
        AccountService::new(
            self.state.store.clone(),
            self.state.media.clone(),
            self.state.config.clone(),
        )
    }

    pub fn turfs(&self) -> TurfService {
        TurfService::new(self.state.store.clone(), self.state.config.clone())
    }

    pub fn bookings(&self) -> BookingService {
        BookingService::new(
            self.state.store.clone(),
            self.state.media.clone(),
            self.state.config.clone(),
        )
    }

    /// Account for `subject`, created as a customer on first contact
    pub async fn customer(&self, subject: &str) -> Account {
        self.accounts().resolve(&identity(subject)).await.unwrap()
    }

    /// Owner with a complete profile offering `slots`
    pub async fn owner(&self, subject: &str, slots: Vec<SlotTemplate>) -> Account {
        let account = self.customer(subject).await;
        self.accounts()
            .save_owner_profile(&account, complete_profile(subject, slots))
            .await
            .unwrap()
    }

    /// Owner plus their active turf
    pub async fn owner_with_turf(&self, subject: &str, slots: Vec<SlotTemplate>) -> (Account, Turf) {
        let owner = self.owner(subject, slots).await;
        let turf = self
            .turfs()
            .create_turf(&owner, turf_input())
            .await
            .unwrap();
        (owner, turf)
    }
}

pub fn identity(subject: &str) -> Identity {
    Identity {
        subject_id: subject.to_string(),
        email: format!("{}@example.com", subject),
        name: Some(format!("User {}", subject)),
        email_verified: true,
    }
}

/// Signed bearer token for `subject`
pub fn token(subject: &str) -> String {
    let now = Utc::now().timestamp();
    let claims = IdentityClaims {
        sub: subject.to_string(),
        email: format!("{}@example.com", subject),
        name: Some(format!("User {}", subject)),
        email_verified: Some(true),
        exp: now + 3600,
        iat: Some(now),
        iss: None,
        aud: None,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

pub fn time(s: &str) -> TimeOfDay {
    TimeOfDay::parse(s).unwrap()
}

pub fn template(day: Weekday, start: &str, end: &str) -> SlotTemplate {
    SlotTemplate::new(day, time(start), time(end)).unwrap()
}

pub fn monday_evening() -> Vec<SlotTemplate> {
    vec![template(Weekday::Monday, "18:00", "19:00")]
}

pub fn complete_profile(subject: &str, slots: Vec<SlotTemplate>) -> OwnerProfileInput {
    OwnerProfileInput {
        business_name: Some(format!("{} Sports Arena", subject)),
        sports: Some(vec![Sport::Cricket, Sport::Football]),
        custom_sport: None,
        amenities: Some(vec![Amenity::Parking, Amenity::Floodlights]),
        about: Some("Floodlit five-a-side and box cricket.".into()),
        pricing: Some(Decimal::from(800)),
        slots: Some(slots),
        location: Some(Location {
            address: "12 Ring Road".into(),
            city: "Pune".into(),
            state: Some("Maharashtra".into()),
            pincode: Some("411001".into()),
        }),
        payment_qr: Some(MediaRef::new("https://media.test/payment-qr/qr.png", "payment-qr/qr")),
    }
}

/// Turf request relying on the profile for everything but the images
pub fn turf_input() -> CreateTurfInput {
    CreateTurfInput {
        images: vec![MediaRef::new("https://media.test/turfs/front.jpg", "turfs/front")],
        ..Default::default()
    }
}

/// A small valid PNG payload
pub fn png(name: &str) -> MediaUpload {
    MediaUpload {
        bytes: vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0, 0, 0, 0],
        content_type: "image/png".into(),
        filename: name.into(),
    }
}

pub fn booking_input(turf: &Turf, date: &str, start: &str, end: &str) -> CreateBookingInput {
    CreateBookingInput {
        turf_id: Some(turf.id),
        owner_id: Some(turf.owner_id.clone()),
        slot: SlotRequest {
            date: date.into(),
            day: None,
            start_time: start.into(),
            end_time: end.into(),
        },
        amount: Some(Decimal::from(800)),
        payment_proof: Some(png("proof.png")),
    }
}
