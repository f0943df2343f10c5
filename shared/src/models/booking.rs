//! Booking request models and the status state machine

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::account::AccountSummary;
use super::slot::BookingSlot;
use super::turf::TurfBrief;
use crate::types::MediaRef;

/// Booking status.
///
/// `Pending` is the only initial state; `Confirmed` and `Rejected` are
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Rejected,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Rejected => "rejected",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(BookingStatus::Pending),
            "confirmed" => Some(BookingStatus::Confirmed),
            "rejected" => Some(BookingStatus::Rejected),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, BookingStatus::Pending)
    }

    /// Pending requests reserve the slot just like confirmed ones
    pub fn blocks_slot(&self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }

    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (BookingStatus::Pending, BookingStatus::Confirmed)
                | (BookingStatus::Pending, BookingStatus::Rejected)
        )
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An owner's verdict on a pending booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Confirmed,
    Rejected,
}

impl From<Decision> for BookingStatus {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Confirmed => BookingStatus::Confirmed,
            Decision::Rejected => BookingStatus::Rejected,
        }
    }
}

/// A customer's request to occupy one slot occurrence on one turf
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub customer_id: String,
    pub owner_id: String,
    pub turf_id: Uuid,
    pub slot: BookingSlot,
    pub status: BookingStatus,
    pub amount: Decimal,
    pub payment_proof: MediaRef,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Whether this booking currently holds the given occurrence on the turf
    pub fn holds(&self, turf_id: Uuid, slot: &BookingSlot) -> bool {
        self.turf_id == turf_id && self.status.blocks_slot() && self.slot.same_occurrence(slot)
    }
}

/// Booking with customer, owner and turf resolved for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingDetails {
    #[serde(flatten)]
    pub booking: Booking,
    pub customer: Option<AccountSummary>,
    pub owner: Option<AccountSummary>,
    pub turf: Option<TurfBrief>,
}
