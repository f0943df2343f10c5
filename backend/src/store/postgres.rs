//! PostgreSQL storage implementation
//!
//! Nested attributes live in JSONB columns. Uniqueness of active bookings and
//! of turfs per owner is enforced by indexes (see `migrations/`); unique
//! violations are reported as conflicts.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use shared::{
    Account, Amenity, Booking, BookingSlot, BookingStatus, ContactInfo, DateRange, Location,
    MediaRef, OwnerProfile, Pagination, Role, SlotTemplate, Sport, TimeOfDay, Turf,
};
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use super::{
    email_taken, slot_taken, turf_exists, AccountStore, BookingFilter, BookingParty, BookingStore,
    Store, StoreResult, TurfStore,
};
use crate::error::AppError;

const UNIQUE_VIOLATION: &str = "23505";

/// Store backed by a PostgreSQL pool
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

/// Name of the unique constraint a database error violated, if that is what it was
fn unique_violation(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            Some(db.constraint().unwrap_or_default().to_string())
        }
        _ => None,
    }
}

// ============================================================================
// Row mapping
// ============================================================================

const ACCOUNT_COLUMNS: &str = "id, name, email, role, phone, is_active, email_verified, \
    owner_profile, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct AccountRow {
    id: String,
    name: String,
    email: String,
    role: String,
    phone: Option<String>,
    is_active: bool,
    email_verified: bool,
    owner_profile: Option<Json<OwnerProfile>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = AppError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let role = Role::from_str(&row.role)
            .ok_or_else(|| AppError::Internal(format!("Unknown role in store: {}", row.role)))?;
        Ok(Account {
            id: row.id,
            name: row.name,
            email: row.email,
            role,
            phone: row.phone,
            is_active: row.is_active,
            email_verified: row.email_verified,
            owner_profile: row.owner_profile.map(|p| p.0),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const TURF_COLUMNS: &str = "id, owner_id, name, description, images, sports, custom_sport, \
    amenities, slots, price_per_hour, location, contact, payment_qr, is_active, rating, \
    review_count, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct TurfRow {
    id: Uuid,
    owner_id: String,
    name: String,
    description: String,
    images: Json<Vec<MediaRef>>,
    sports: Json<Vec<Sport>>,
    custom_sport: Option<String>,
    amenities: Json<Vec<Amenity>>,
    slots: Json<Vec<SlotTemplate>>,
    price_per_hour: Decimal,
    location: Json<Location>,
    contact: Json<ContactInfo>,
    payment_qr: Option<Json<MediaRef>>,
    is_active: bool,
    rating: Decimal,
    review_count: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TurfRow> for Turf {
    fn from(row: TurfRow) -> Self {
        Turf {
            id: row.id,
            owner_id: row.owner_id,
            name: row.name,
            description: row.description,
            images: row.images.0,
            sports: row.sports.0,
            custom_sport: row.custom_sport,
            amenities: row.amenities.0,
            slots: row.slots.0,
            price_per_hour: row.price_per_hour,
            location: row.location.0,
            contact: row.contact.0,
            payment_qr: row.payment_qr.map(|q| q.0),
            is_active: row.is_active,
            rating: row.rating,
            review_count: row.review_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const BOOKING_COLUMNS: &str = "id, customer_id, owner_id, turf_id, slot_date, start_time, \
    end_time, status, amount, payment_proof, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    customer_id: String,
    owner_id: String,
    turf_id: Uuid,
    slot_date: NaiveDate,
    start_time: String,
    end_time: String,
    status: String,
    amount: Decimal,
    payment_proof: Json<MediaRef>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = AppError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let corrupt = |what: &str| AppError::Internal(format!("Corrupt booking {}: {}", id, what));
        let start = TimeOfDay::parse(&row.start_time).ok_or_else(|| corrupt("start_time"))?;
        let end = TimeOfDay::parse(&row.end_time).ok_or_else(|| corrupt("end_time"))?;
        let slot = BookingSlot::new(row.slot_date, start, end).map_err(|_| corrupt("slot"))?;
        let status = BookingStatus::from_str(&row.status).ok_or_else(|| corrupt("status"))?;

        Ok(Booking {
            id: row.id,
            customer_id: row.customer_id,
            owner_id: row.owner_id,
            turf_id: row.turf_id,
            slot,
            status,
            amount: row.amount,
            payment_proof: row.payment_proof.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn bookings_from_rows(rows: Vec<BookingRow>) -> StoreResult<Vec<Booking>> {
    rows.into_iter().map(Booking::try_from).collect()
}

// ============================================================================
// Accounts
// ============================================================================

#[axum::async_trait]
impl AccountStore for PgStore {
    async fn get_account(&self, id: &str) -> StoreResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        row.map(Account::try_from).transpose()
    }

    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = $1"
        ))
        .bind(email.to_lowercase())
        .fetch_optional(&self.db)
        .await?;

        row.map(Account::try_from).transpose()
    }

    async fn insert_account(&self, account: Account) -> StoreResult<Account> {
        let result = sqlx::query(
            r#"
            INSERT INTO accounts (id, name, email, role, phone, is_active, email_verified,
                                  owner_profile, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(&account.id)
        .bind(&account.name)
        .bind(&account.email)
        .bind(account.role.as_str())
        .bind(&account.phone)
        .bind(account.is_active)
        .bind(account.email_verified)
        .bind(account.owner_profile.as_ref().map(Json))
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.db)
        .await;

        match result {
            Ok(_) => Ok(account),
            Err(e) => match unique_violation(&e) {
                Some(constraint) if constraint.contains("email") => Err(email_taken()),
                Some(_) => Err(AppError::conflict("account", "Account already exists")),
                None => Err(e.into()),
            },
        }
    }

    async fn update_account(&self, account: Account) -> StoreResult<Account> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET name = $2, email = $3, role = $4, phone = $5, is_active = $6,
                email_verified = $7, owner_profile = $8, updated_at = $9
            WHERE id = $1
            "#,
        )
        .bind(&account.id)
        .bind(&account.name)
        .bind(&account.email)
        .bind(account.role.as_str())
        .bind(&account.phone)
        .bind(account.is_active)
        .bind(account.email_verified)
        .bind(account.owner_profile.as_ref().map(Json))
        .bind(account.updated_at)
        .execute(&self.db)
        .await;

        match result {
            Ok(done) if done.rows_affected() == 0 => Err(AppError::NotFound("Account".into())),
            Ok(_) => Ok(account),
            Err(e) if unique_violation(&e).is_some() => Err(email_taken()),
            Err(e) => Err(e.into()),
        }
    }
}

// ============================================================================
// Turfs
// ============================================================================

#[axum::async_trait]
impl TurfStore for PgStore {
    async fn get_turf(&self, id: Uuid) -> StoreResult<Option<Turf>> {
        let row = sqlx::query_as::<_, TurfRow>(&format!(
            "SELECT {TURF_COLUMNS} FROM turfs WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Turf::from))
    }

    async fn find_turf_by_owner(&self, owner_id: &str) -> StoreResult<Option<Turf>> {
        let row = sqlx::query_as::<_, TurfRow>(&format!(
            "SELECT {TURF_COLUMNS} FROM turfs WHERE owner_id = $1"
        ))
        .bind(owner_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Turf::from))
    }

    async fn list_active_turfs(&self) -> StoreResult<Vec<Turf>> {
        let rows = sqlx::query_as::<_, TurfRow>(&format!(
            "SELECT {TURF_COLUMNS} FROM turfs WHERE is_active ORDER BY created_at DESC"
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Turf::from).collect())
    }

    async fn insert_turf(&self, turf: Turf) -> StoreResult<Turf> {
        let result = sqlx::query(
            r#"
            INSERT INTO turfs (id, owner_id, name, description, images, sports, custom_sport,
                               amenities, slots, price_per_hour, location, contact, payment_qr,
                               is_active, rating, review_count, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            "#,
        )
        .bind(turf.id)
        .bind(&turf.owner_id)
        .bind(&turf.name)
        .bind(&turf.description)
        .bind(Json(&turf.images))
        .bind(Json(&turf.sports))
        .bind(&turf.custom_sport)
        .bind(Json(&turf.amenities))
        .bind(Json(&turf.slots))
        .bind(turf.price_per_hour)
        .bind(Json(&turf.location))
        .bind(Json(&turf.contact))
        .bind(turf.payment_qr.as_ref().map(Json))
        .bind(turf.is_active)
        .bind(turf.rating)
        .bind(turf.review_count)
        .bind(turf.created_at)
        .bind(turf.updated_at)
        .execute(&self.db)
        .await;

        match result {
            Ok(_) => Ok(turf),
            Err(e) if unique_violation(&e).is_some() => Err(turf_exists()),
            Err(e) => Err(e.into()),
        }
    }

    async fn update_turf(&self, turf: Turf) -> StoreResult<Turf> {
        let done = sqlx::query(
            r#"
            UPDATE turfs
            SET name = $2, description = $3, images = $4, sports = $5, custom_sport = $6,
                amenities = $7, slots = $8, price_per_hour = $9, location = $10, contact = $11,
                payment_qr = $12, is_active = $13, updated_at = $14
            WHERE id = $1
            "#,
        )
        .bind(turf.id)
        .bind(&turf.name)
        .bind(&turf.description)
        .bind(Json(&turf.images))
        .bind(Json(&turf.sports))
        .bind(&turf.custom_sport)
        .bind(Json(&turf.amenities))
        .bind(Json(&turf.slots))
        .bind(turf.price_per_hour)
        .bind(Json(&turf.location))
        .bind(Json(&turf.contact))
        .bind(turf.payment_qr.as_ref().map(Json))
        .bind(turf.is_active)
        .bind(turf.updated_at)
        .execute(&self.db)
        .await?;

        if done.rows_affected() == 0 {
            return Err(AppError::NotFound("Turf".into()));
        }
        Ok(turf)
    }
}

// ============================================================================
// Bookings
// ============================================================================

#[axum::async_trait]
impl BookingStore for PgStore {
    async fn get_booking(&self, id: Uuid) -> StoreResult<Option<Booking>> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        row.map(Booking::try_from).transpose()
    }

    async fn bookings_for_turf(&self, turf_id: Uuid, range: &DateRange) -> StoreResult<Vec<Booking>> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings \
             WHERE turf_id = $1 AND slot_date BETWEEN $2 AND $3"
        ))
        .bind(turf_id)
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.db)
        .await?;

        bookings_from_rows(rows)
    }

    async fn find_blocking_booking(
        &self,
        turf_id: Uuid,
        slot: &BookingSlot,
    ) -> StoreResult<Option<Booking>> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings \
             WHERE turf_id = $1 AND slot_date = $2 AND start_time = $3 AND end_time = $4 \
               AND status IN ('pending', 'confirmed') \
             LIMIT 1"
        ))
        .bind(turf_id)
        .bind(slot.date)
        .bind(slot.start_time.to_string())
        .bind(slot.end_time.to_string())
        .fetch_optional(&self.db)
        .await?;

        row.map(Booking::try_from).transpose()
    }

    async fn insert_booking(&self, booking: Booking) -> StoreResult<Booking> {
        let result = sqlx::query(
            r#"
            INSERT INTO bookings (id, customer_id, owner_id, turf_id, slot_date, slot_day,
                                  start_time, end_time, status, amount, payment_proof,
                                  created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(booking.id)
        .bind(&booking.customer_id)
        .bind(&booking.owner_id)
        .bind(booking.turf_id)
        .bind(booking.slot.date)
        .bind(booking.slot.day.as_str())
        .bind(booking.slot.start_time.to_string())
        .bind(booking.slot.end_time.to_string())
        .bind(booking.status.as_str())
        .bind(booking.amount)
        .bind(Json(&booking.payment_proof))
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .execute(&self.db)
        .await;

        match result {
            Ok(_) => Ok(booking),
            Err(e) if unique_violation(&e).is_some() => Err(slot_taken()),
            Err(e) => Err(e.into()),
        }
    }

    async fn decide_booking(
        &self,
        id: Uuid,
        status: BookingStatus,
        decided_at: DateTime<Utc>,
    ) -> StoreResult<Option<Booking>> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "UPDATE bookings SET status = $2, updated_at = $3 \
             WHERE id = $1 AND status = 'pending' \
             RETURNING {BOOKING_COLUMNS}"
        ))
        .bind(id)
        .bind(status.as_str())
        .bind(decided_at)
        .fetch_optional(&self.db)
        .await?;

        row.map(Booking::try_from).transpose()
    }

    async fn list_bookings(
        &self,
        filter: &BookingFilter,
        pagination: &Pagination,
    ) -> StoreResult<(Vec<Booking>, u64)> {
        let (column, party_id) = match &filter.party {
            BookingParty::Customer(id) => ("customer_id", id),
            BookingParty::Owner(id) => ("owner_id", id),
        };
        let status = filter.status.map(|s| s.as_str());
        let condition = format!("{column} = $1 AND ($2::varchar IS NULL OR status = $2)");

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM bookings WHERE {condition}"
        ))
        .bind(party_id)
        .bind(status)
        .fetch_one(&self.db)
        .await?;

        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE {condition} \
             ORDER BY created_at DESC, id DESC \
             LIMIT $3 OFFSET $4"
        ))
        .bind(party_id)
        .bind(status)
        .bind(pagination.limit() as i64)
        .bind(pagination.offset() as i64)
        .fetch_all(&self.db)
        .await?;

        Ok((bookings_from_rows(rows)?, total.max(0) as u64))
    }
}

#[axum::async_trait]
impl Store for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.db).await?;
        Ok(())
    }
}
