//! Booking workflow service
//!
//! Availability reads, booking creation with payment proof, owner decisions
//! and per-party listings.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{
    compute_availability, validate_positive_amount, Account, AccountSummary, Booking,
    BookingDetails, BookingStatus, DateRange, Decision, MediaFolder, PaginatedResponse,
    Pagination, PaginationMeta, SlotAvailability, SlotRequest, TurfBrief,
};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::media::{MediaStore, MediaUpload};
use crate::store::{slot_taken, BookingFilter, BookingParty, Store};
use crate::Config;

/// Booking service for the request and approval workflow
#[derive(Clone)]
pub struct BookingService {
    store: Arc<dyn Store>,
    media: Arc<dyn MediaStore>,
    config: Arc<Config>,
}

/// Optional availability window
#[derive(Debug, Default, Deserialize)]
pub struct AvailabilityQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct TurfAvailability {
    pub turf_id: Uuid,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub slots: Vec<SlotAvailability>,
}

/// A customer's booking request as received
#[derive(Debug, Default)]
pub struct CreateBookingInput {
    pub turf_id: Option<Uuid>,
    pub owner_id: Option<String>,
    pub slot: SlotRequest,
    pub amount: Option<Decimal>,
    pub payment_proof: Option<MediaUpload>,
}

#[derive(Debug, Deserialize)]
pub struct DecisionInput {
    pub status: String,
}

impl DecisionInput {
    pub fn decision(&self) -> AppResult<Decision> {
        match self.status.trim() {
            "confirmed" => Ok(Decision::Confirmed),
            "rejected" => Ok(Decision::Rejected),
            other => Err(AppError::validation(
                "status",
                format!("Decision must be confirmed or rejected, got {:?}", other),
            )),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListBookingsQuery {
    pub status: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl BookingService {
    pub fn new(store: Arc<dyn Store>, media: Arc<dyn MediaStore>, config: Arc<Config>) -> Self {
        Self {
            store,
            media,
            config,
        }
    }

    // ========================================================================
    // Availability
    // ========================================================================

    fn availability_range(&self, query: &AvailabilityQuery, today: NaiveDate) -> AppResult<DateRange> {
        let window = self.config.booking.availability_window_days.max(1);
        let range = match (query.from, query.to) {
            (Some(from), Some(to)) => DateRange::new(from, to)?,
            (Some(from), None) => DateRange::starting_at(from, window)?,
            (None, Some(to)) => DateRange::new(today, to).map_err(|_| {
                AppError::validation("to", "Range end must not be before today")
            })?,
            (None, None) => DateRange::starting_at(today, window)?,
        };

        let max_days = i64::from(self.config.booking.max_availability_range_days);
        if range.len_days() > max_days {
            return Err(AppError::validation(
                "to",
                format!("Availability range cannot exceed {} days", max_days),
            ));
        }
        Ok(range)
    }

    /// Slot occurrences of a turf over a date range, each marked booked or free
    pub async fn availability(&self, turf_id: Uuid, query: AvailabilityQuery) -> AppResult<TurfAvailability> {
        let range = self.availability_range(&query, Utc::now().date_naive())?;

        let turf = self
            .store
            .get_turf(turf_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Turf".into()))?;

        let bookings = self.store.bookings_for_turf(turf_id, &range).await?;

        Ok(TurfAvailability {
            turf_id,
            from: range.start,
            to: range.end,
            slots: compute_availability(turf_id, &turf.slots, &bookings, &range),
        })
    }

    // ========================================================================
    // Creation
    // ========================================================================

    /// Create a pending booking for one slot occurrence.
    ///
    /// The proof is uploaded only after every check passes; the store's
    /// atomic insert decides races between concurrent requests.
    pub async fn create_booking(
        &self,
        customer: &Account,
        input: CreateBookingInput,
    ) -> AppResult<BookingDetails> {
        if !customer.is_customer() {
            return Err(AppError::Forbidden("Only customers can book a turf".into()));
        }

        let turf_id = input
            .turf_id
            .ok_or_else(|| AppError::validation("turf_id", "Turf is required"))?;
        let turf = self
            .store
            .get_turf(turf_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Turf".into()))?;
        if !turf.is_active {
            return Err(AppError::validation("turf_id", "Turf is not accepting bookings"));
        }

        let owner = self
            .store
            .get_account(&turf.owner_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Owner".into()))?;
        if !owner.is_owner() {
            return Err(AppError::validation("owner_id", "Turf owner is not an active owner"));
        }
        if let Some(claimed) = input.owner_id.as_deref().filter(|o| !o.trim().is_empty()) {
            if claimed != owner.id {
                return Err(AppError::validation("owner_id", "Owner does not match the turf"));
            }
        }

        let slot = input.slot.resolve()?;
        if slot.date < Utc::now().date_naive() {
            return Err(AppError::validation("date", "Cannot book a date in the past"));
        }
        if !turf.offers(&slot) {
            return Err(AppError::validation(
                "slot",
                format!(
                    "{} {}-{} is not offered by this turf",
                    slot.day, slot.start_time, slot.end_time
                ),
            ));
        }

        let amount = input
            .amount
            .ok_or_else(|| AppError::validation("amount", "Amount is required"))?;
        validate_positive_amount(amount).map_err(|msg| AppError::validation("amount", msg))?;

        let proof = input
            .payment_proof
            .ok_or_else(|| AppError::validation("payment_proof", "Payment proof is required"))?;
        proof.validate("payment_proof", self.config.media.max_upload_bytes)?;

        if self.store.find_blocking_booking(turf.id, &slot).await?.is_some() {
            return Err(slot_taken());
        }

        let payment_proof = self.media.upload(proof, MediaFolder::PaymentProofs).await?;

        let now = Utc::now();
        let booking = Booking {
            id: Uuid::new_v4(),
            customer_id: customer.id.clone(),
            owner_id: owner.id.clone(),
            turf_id: turf.id,
            slot,
            status: BookingStatus::Pending,
            amount,
            payment_proof,
            created_at: now,
            updated_at: now,
        };
        let booking = self.store.insert_booking(booking).await?;

        tracing::info!(
            booking_id = %booking.id,
            turf_id = %booking.turf_id,
            date = %booking.slot.date,
            start = %booking.slot.start_time,
            "Booking requested"
        );

        Ok(BookingDetails {
            booking,
            customer: Some(customer.summary()),
            owner: Some(owner.summary()),
            turf: Some(turf.brief()),
        })
    }

    // ========================================================================
    // Decisions
    // ========================================================================

    /// Confirm or reject a pending booking. Only its owner may decide, once.
    pub async fn decide(
        &self,
        owner: &Account,
        booking_id: Uuid,
        decision: Decision,
    ) -> AppResult<BookingDetails> {
        let booking = self
            .store
            .get_booking(booking_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking".into()))?;

        if booking.owner_id != owner.id {
            return Err(AppError::Forbidden("You do not own this booking".into()));
        }
        if booking.status.is_terminal() {
            return Err(AppError::AlreadyProcessed);
        }

        let status = BookingStatus::from(decision);
        let decided = self
            .store
            .decide_booking(booking_id, status, Utc::now())
            .await?
            .ok_or(AppError::AlreadyProcessed)?;

        tracing::info!(booking_id = %decided.id, status = %decided.status, "Booking decided");

        self.details(decided).await
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// A booking as seen by its customer or owner
    pub async fn get_booking(&self, viewer: &Account, booking_id: Uuid) -> AppResult<BookingDetails> {
        let booking = self
            .store
            .get_booking(booking_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking".into()))?;

        if booking.customer_id != viewer.id && booking.owner_id != viewer.id {
            return Err(AppError::Forbidden("You are not a party to this booking".into()));
        }
        self.details(booking).await
    }

    /// Bookings the account made as a customer
    pub async fn list_for_customer(
        &self,
        customer: &Account,
        query: ListBookingsQuery,
    ) -> AppResult<PaginatedResponse<BookingDetails>> {
        self.list(BookingParty::Customer(customer.id.clone()), query)
            .await
    }

    /// Bookings made against the owner's turf
    pub async fn list_for_owner(
        &self,
        owner: &Account,
        query: ListBookingsQuery,
    ) -> AppResult<PaginatedResponse<BookingDetails>> {
        if !owner.is_owner() {
            return Err(AppError::Forbidden("Only turf owners receive bookings".into()));
        }
        self.list(BookingParty::Owner(owner.id.clone()), query).await
    }

    async fn list(
        &self,
        party: BookingParty,
        query: ListBookingsQuery,
    ) -> AppResult<PaginatedResponse<BookingDetails>> {
        let status = match query.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            None => None,
            Some(s) => Some(
                BookingStatus::from_str(s)
                    .ok_or_else(|| AppError::validation("status", format!("Unknown status: {}", s)))?,
            ),
        };
        let pagination = Pagination::from_query(
            query.page,
            query.page_size,
            self.config.booking.default_page_size,
            self.config.booking.max_page_size,
        )?;

        let filter = BookingFilter { party, status };
        let (bookings, total) = self.store.list_bookings(&filter, &pagination).await?;

        let mut resolver = SummaryResolver::default();
        let mut data = Vec::with_capacity(bookings.len());
        for booking in bookings {
            data.push(resolver.details(self.store.as_ref(), booking).await?);
        }

        Ok(PaginatedResponse {
            data,
            pagination: PaginationMeta::new(&pagination, total),
        })
    }

    async fn details(&self, booking: Booking) -> AppResult<BookingDetails> {
        SummaryResolver::default()
            .details(self.store.as_ref(), booking)
            .await
    }
}

/// Resolves and caches account and turf summaries while building a page
#[derive(Default)]
struct SummaryResolver {
    accounts: HashMap<String, Option<AccountSummary>>,
    turfs: HashMap<Uuid, Option<TurfBrief>>,
}

impl SummaryResolver {
    async fn account(&mut self, store: &dyn Store, id: &str) -> AppResult<Option<AccountSummary>> {
        if let Some(cached) = self.accounts.get(id) {
            return Ok(cached.clone());
        }
        let summary = store.get_account(id).await?.map(|a| a.summary());
        self.accounts.insert(id.to_string(), summary.clone());
        Ok(summary)
    }

    async fn turf(&mut self, store: &dyn Store, id: Uuid) -> AppResult<Option<TurfBrief>> {
        if let Some(cached) = self.turfs.get(&id) {
            return Ok(cached.clone());
        }
        let brief = store.get_turf(id).await?.map(|t| t.brief());
        self.turfs.insert(id, brief.clone());
        Ok(brief)
    }

    async fn details(&mut self, store: &dyn Store, booking: Booking) -> AppResult<BookingDetails> {
        let customer = self.account(store, &booking.customer_id).await?;
        let owner = self.account(store, &booking.owner_id).await?;
        let turf = self.turf(store, booking.turf_id).await?;
        Ok(BookingDetails {
            booking,
            customer,
            owner,
            turf,
        })
    }
}
