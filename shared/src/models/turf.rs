//! Turf listing models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::catalog::{validate_amenities, validate_sports, Amenity, Sport};
use super::slot::{validate_slot_templates, BookingSlot, SlotTemplate};
use crate::types::{Location, MediaRef};
use crate::validation::{validate_positive_amount, FieldError};

/// One bookable facility
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turf {
    pub id: Uuid,
    pub owner_id: String,
    pub name: String,
    pub description: String,
    pub images: Vec<MediaRef>,
    pub sports: Vec<Sport>,
    pub custom_sport: Option<String>,
    pub amenities: Vec<Amenity>,
    pub slots: Vec<SlotTemplate>,
    pub price_per_hour: Decimal,
    pub location: Location,
    pub contact: ContactInfo,
    pub payment_qr: Option<MediaRef>,
    pub is_active: bool,
    /// Cosmetic, not derived from reviews
    pub rating: Decimal,
    pub review_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Owner contact details copied onto the turf
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ContactInfo {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub business_name: String,
}

impl Turf {
    /// Check the listing invariants that must hold after every create or update
    pub fn validate(&self) -> Result<(), FieldError> {
        if self.name.trim().is_empty() {
            return Err(FieldError::new("name", "Turf name cannot be empty"));
        }
        if self.images.is_empty() {
            return Err(FieldError::new("images", "At least one image is required"));
        }
        if self.images.iter().any(|img| img.url.trim().is_empty()) {
            return Err(FieldError::new("images", "Image URL cannot be empty"));
        }
        validate_sports(&self.sports, self.custom_sport.as_deref())?;
        validate_amenities(&self.amenities)?;
        validate_slot_templates(&self.slots)?;
        validate_positive_amount(self.price_per_hour)
            .map_err(|msg| FieldError::new("price_per_hour", msg))?;
        self.location.validate()?;
        if self.rating < Decimal::ZERO || self.rating > Decimal::from(5) {
            return Err(FieldError::new("rating", "Rating must be between 0 and 5"));
        }
        Ok(())
    }

    /// Whether the slot corresponds to one of this turf's weekly templates
    pub fn offers(&self, slot: &BookingSlot) -> bool {
        self.slots.iter().any(|t| slot.matches_template(t))
    }

    pub fn offers_sport(&self, sport: Sport) -> bool {
        self.sports.contains(&sport)
    }

    /// Public listing view; the payment QR is left out
    pub fn to_summary(&self) -> TurfSummary {
        TurfSummary {
            id: self.id,
            owner_id: self.owner_id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            images: self.images.clone(),
            sports: self.sports.clone(),
            custom_sport: self.custom_sport.clone(),
            amenities: self.amenities.clone(),
            price_per_hour: self.price_per_hour,
            location: self.location.clone(),
            business_name: self.contact.business_name.clone(),
            rating: self.rating,
            review_count: self.review_count,
            slot_count: self.slots.len(),
            created_at: self.created_at,
        }
    }

    pub fn brief(&self) -> TurfBrief {
        TurfBrief {
            id: self.id,
            name: self.name.clone(),
            location: self.location.clone(),
            image: self.images.first().cloned(),
        }
    }
}

/// Listing as shown in public search results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurfSummary {
    pub id: Uuid,
    pub owner_id: String,
    pub name: String,
    pub description: String,
    pub images: Vec<MediaRef>,
    pub sports: Vec<Sport>,
    pub custom_sport: Option<String>,
    pub amenities: Vec<Amenity>,
    pub price_per_hour: Decimal,
    pub location: Location,
    pub business_name: String,
    pub rating: Decimal,
    pub review_count: i32,
    pub slot_count: usize,
    pub created_at: DateTime<Utc>,
}

/// Minimal turf reference embedded in booking read models
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TurfBrief {
    pub id: Uuid,
    pub name: String,
    pub location: Location,
    pub image: Option<MediaRef>,
}
