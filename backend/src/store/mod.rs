//! Persistence traits
//!
//! Services talk to storage only through these traits. `PgStore` backs
//! production; `MemoryStore` backs tests and local runs. Both enforce the
//! uniqueness rules themselves: one blocking booking per slot occurrence and
//! one turf per owner.

use chrono::{DateTime, Utc};
use shared::{Account, Booking, BookingSlot, BookingStatus, DateRange, Pagination, Turf};
use uuid::Uuid;

use crate::error::AppError;

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub type StoreResult<T> = Result<T, AppError>;

/// Which side of a booking is listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingParty {
    Customer(String),
    Owner(String),
}

#[derive(Debug, Clone)]
pub struct BookingFilter {
    pub party: BookingParty,
    pub status: Option<BookingStatus>,
}

impl BookingFilter {
    pub fn matches(&self, booking: &Booking) -> bool {
        let party = match &self.party {
            BookingParty::Customer(id) => &booking.customer_id == id,
            BookingParty::Owner(id) => &booking.owner_id == id,
        };
        party && self.status.map_or(true, |s| s == booking.status)
    }
}

#[axum::async_trait]
pub trait AccountStore: Send + Sync {
    async fn get_account(&self, id: &str) -> StoreResult<Option<Account>>;

    /// Lookup by lowercase email
    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<Account>>;

    /// Fails with `Conflict` when the id or email is already taken
    async fn insert_account(&self, account: Account) -> StoreResult<Account>;

    async fn update_account(&self, account: Account) -> StoreResult<Account>;
}

#[axum::async_trait]
pub trait TurfStore: Send + Sync {
    async fn get_turf(&self, id: Uuid) -> StoreResult<Option<Turf>>;

    async fn find_turf_by_owner(&self, owner_id: &str) -> StoreResult<Option<Turf>>;

    async fn list_active_turfs(&self) -> StoreResult<Vec<Turf>>;

    /// Fails with `Conflict` when the owner already has a turf
    async fn insert_turf(&self, turf: Turf) -> StoreResult<Turf>;

    async fn update_turf(&self, turf: Turf) -> StoreResult<Turf>;
}

#[axum::async_trait]
pub trait BookingStore: Send + Sync {
    async fn get_booking(&self, id: Uuid) -> StoreResult<Option<Booking>>;

    /// Bookings on a turf whose slot date falls within `range`
    async fn bookings_for_turf(&self, turf_id: Uuid, range: &DateRange) -> StoreResult<Vec<Booking>>;

    /// The pending or confirmed booking holding this occurrence, if any
    async fn find_blocking_booking(
        &self,
        turf_id: Uuid,
        slot: &BookingSlot,
    ) -> StoreResult<Option<Booking>>;

    /// Insert a pending booking.
    ///
    /// Fails with `Conflict` when another blocking booking already holds the
    /// same (turf, date, start, end); the check and the insert are atomic.
    async fn insert_booking(&self, booking: Booking) -> StoreResult<Booking>;

    /// Move a pending booking to `status`.
    ///
    /// Returns `None` when the booking is no longer pending, leaving it
    /// untouched.
    async fn decide_booking(
        &self,
        id: Uuid,
        status: BookingStatus,
        decided_at: DateTime<Utc>,
    ) -> StoreResult<Option<Booking>>;

    /// Matching bookings newest first, with the total count before paging
    async fn list_bookings(
        &self,
        filter: &BookingFilter,
        pagination: &Pagination,
    ) -> StoreResult<(Vec<Booking>, u64)>;
}

#[axum::async_trait]
pub trait Store: AccountStore + TurfStore + BookingStore {
    /// Connectivity check for health reporting
    async fn ping(&self) -> StoreResult<()>;
}

pub(crate) fn slot_taken() -> AppError {
    AppError::conflict("slot", "slot no longer available")
}

pub(crate) fn turf_exists() -> AppError {
    AppError::conflict("turf", "Owner already has a turf listing")
}

pub(crate) fn email_taken() -> AppError {
    AppError::conflict("email", "Email is already registered to another account")
}
