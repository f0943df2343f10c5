//! In-memory storage implementation

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use shared::{Account, Booking, BookingSlot, BookingStatus, DateRange, Pagination, Turf};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    email_taken, slot_taken, turf_exists, AccountStore, BookingFilter, BookingStore, Store,
    StoreResult, TurfStore,
};
use crate::error::AppError;

/// Store holding everything in process memory.
///
/// Each collection sits behind its own lock; writes that must check before
/// inserting do both under one write guard.
#[derive(Default)]
pub struct MemoryStore {
    accounts: RwLock<HashMap<String, Account>>,
    turfs: RwLock<HashMap<Uuid, Turf>>,
    bookings: RwLock<HashMap<Uuid, Booking>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(a: &Booking, b: &Booking) -> std::cmp::Ordering {
    b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id))
}

#[axum::async_trait]
impl AccountStore for MemoryStore {
    async fn get_account(&self, id: &str) -> StoreResult<Option<Account>> {
        Ok(self.accounts.read().await.get(id).cloned())
    }

    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        let email = email.to_lowercase();
        Ok(self
            .accounts
            .read()
            .await
            .values()
            .find(|a| a.email == email)
            .cloned())
    }

    async fn insert_account(&self, account: Account) -> StoreResult<Account> {
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&account.id) {
            return Err(AppError::conflict("account", "Account already exists"));
        }
        if accounts.values().any(|a| a.email == account.email) {
            return Err(email_taken());
        }
        accounts.insert(account.id.clone(), account.clone());
        Ok(account)
    }

    async fn update_account(&self, account: Account) -> StoreResult<Account> {
        let mut accounts = self.accounts.write().await;
        if accounts
            .values()
            .any(|a| a.id != account.id && a.email == account.email)
        {
            return Err(email_taken());
        }
        match accounts.get_mut(&account.id) {
            Some(existing) => {
                *existing = account.clone();
                Ok(account)
            }
            None => Err(AppError::NotFound("Account".into())),
        }
    }
}

#[axum::async_trait]
impl TurfStore for MemoryStore {
    async fn get_turf(&self, id: Uuid) -> StoreResult<Option<Turf>> {
        Ok(self.turfs.read().await.get(&id).cloned())
    }

    async fn find_turf_by_owner(&self, owner_id: &str) -> StoreResult<Option<Turf>> {
        Ok(self
            .turfs
            .read()
            .await
            .values()
            .find(|t| t.owner_id == owner_id)
            .cloned())
    }

    async fn list_active_turfs(&self) -> StoreResult<Vec<Turf>> {
        Ok(self
            .turfs
            .read()
            .await
            .values()
            .filter(|t| t.is_active)
            .cloned()
            .collect())
    }

    async fn insert_turf(&self, turf: Turf) -> StoreResult<Turf> {
        let mut turfs = self.turfs.write().await;
        if turfs.values().any(|t| t.owner_id == turf.owner_id) {
            return Err(turf_exists());
        }
        turfs.insert(turf.id, turf.clone());
        Ok(turf)
    }

    async fn update_turf(&self, turf: Turf) -> StoreResult<Turf> {
        let mut turfs = self.turfs.write().await;
        match turfs.get_mut(&turf.id) {
            Some(existing) => {
                *existing = turf.clone();
                Ok(turf)
            }
            None => Err(AppError::NotFound("Turf".into())),
        }
    }
}

#[axum::async_trait]
impl BookingStore for MemoryStore {
    async fn get_booking(&self, id: Uuid) -> StoreResult<Option<Booking>> {
        Ok(self.bookings.read().await.get(&id).cloned())
    }

    async fn bookings_for_turf(&self, turf_id: Uuid, range: &DateRange) -> StoreResult<Vec<Booking>> {
        Ok(self
            .bookings
            .read()
            .await
            .values()
            .filter(|b| b.turf_id == turf_id && range.contains(b.slot.date))
            .cloned()
            .collect())
    }

    async fn find_blocking_booking(
        &self,
        turf_id: Uuid,
        slot: &BookingSlot,
    ) -> StoreResult<Option<Booking>> {
        Ok(self
            .bookings
            .read()
            .await
            .values()
            .find(|b| b.holds(turf_id, slot))
            .cloned())
    }

    async fn insert_booking(&self, booking: Booking) -> StoreResult<Booking> {
        let mut bookings = self.bookings.write().await;
        if bookings
            .values()
            .any(|b| b.holds(booking.turf_id, &booking.slot))
        {
            return Err(slot_taken());
        }
        bookings.insert(booking.id, booking.clone());
        Ok(booking)
    }

    async fn decide_booking(
        &self,
        id: Uuid,
        status: BookingStatus,
        decided_at: DateTime<Utc>,
    ) -> StoreResult<Option<Booking>> {
        let mut bookings = self.bookings.write().await;
        match bookings.get_mut(&id) {
            Some(booking) if booking.status.can_transition_to(status) => {
                booking.status = status;
                booking.updated_at = decided_at;
                Ok(Some(booking.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn list_bookings(
        &self,
        filter: &BookingFilter,
        pagination: &Pagination,
    ) -> StoreResult<(Vec<Booking>, u64)> {
        let mut matched: Vec<Booking> = self
            .bookings
            .read()
            .await
            .values()
            .filter(|b| filter.matches(b))
            .cloned()
            .collect();
        matched.sort_by(newest_first);
        let total = matched.len() as u64;
        Ok((pagination.apply(&matched), total))
    }
}

#[axum::async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
