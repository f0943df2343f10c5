//! Turf listing service: creation, updates and public search

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{
    search_turfs, Account, Amenity, ContactInfo, Location, MediaRef, SlotTemplate, Sport, Turf,
    TurfQueryParams, TurfSearchResult,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::store::Store;
use crate::Config;

/// Turf service for listing management
#[derive(Clone)]
pub struct TurfService {
    store: Arc<dyn Store>,
    config: Arc<Config>,
}

/// Input for creating a turf; omitted fields default from the owner profile
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CreateTurfInput {
    #[validate(length(min = 1, max = 200, message = "Turf name must be 1 to 200 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,
    #[serde(default)]
    pub images: Vec<MediaRef>,
    pub sports: Option<Vec<Sport>>,
    pub custom_sport: Option<String>,
    pub amenities: Option<Vec<Amenity>>,
    pub slots: Option<Vec<SlotTemplate>>,
    pub price_per_hour: Option<Decimal>,
    pub location: Option<Location>,
}

/// Input for updating a turf; omitted fields are left unchanged
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTurfInput {
    #[validate(length(min = 1, max = 200, message = "Turf name must be 1 to 200 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,
    pub images: Option<Vec<MediaRef>>,
    pub sports: Option<Vec<Sport>>,
    pub custom_sport: Option<String>,
    pub amenities: Option<Vec<Amenity>>,
    pub slots: Option<Vec<SlotTemplate>>,
    pub price_per_hour: Option<Decimal>,
    pub location: Option<Location>,
    pub is_active: Option<bool>,
}

fn contact_of(account: &Account) -> ContactInfo {
    ContactInfo {
        name: account.name.clone(),
        email: account.email.clone(),
        phone: account.phone.clone(),
        business_name: account
            .owner_profile
            .as_ref()
            .and_then(|p| p.business_name.clone())
            .unwrap_or_default(),
    }
}

impl TurfService {
    pub fn new(store: Arc<dyn Store>, config: Arc<Config>) -> Self {
        Self { store, config }
    }

    /// Public listing search.
    ///
    /// A store failure here is reported as `ServiceUnavailable`; no stand-in
    /// listings are ever returned.
    pub async fn search(&self, params: TurfQueryParams) -> AppResult<TurfSearchResult> {
        let query = params.into_query(
            self.config.listing.default_page_size,
            self.config.listing.max_page_size,
        )?;

        let turfs = self.store.list_active_turfs().await.map_err(|e| {
            tracing::error!(error = %e, "Listing store unavailable");
            AppError::ServiceUnavailable(e.to_string())
        })?;

        Ok(search_turfs(&turfs, &query))
    }

    /// Fetch one turf; inactive turfs are visible to their owner only
    pub async fn get_turf(&self, turf_id: Uuid, viewer: Option<&Account>) -> AppResult<Turf> {
        let turf = self
            .store
            .get_turf(turf_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Turf".into()))?;

        if !turf.is_active && viewer.map_or(true, |v| v.id != turf.owner_id) {
            return Err(AppError::NotFound("Turf".into()));
        }
        Ok(turf)
    }

    /// Create the owner's turf from the request plus their profile
    pub async fn create_turf(&self, owner: &Account, input: CreateTurfInput) -> AppResult<Turf> {
        if !owner.is_owner() {
            return Err(AppError::Forbidden("Only turf owners can create a turf".into()));
        }
        let profile = owner.complete_owner_profile()?;
        input.validate()?;

        if self.store.find_turf_by_owner(&owner.id).await?.is_some() {
            return Err(AppError::conflict("turf", "Owner already has a turf listing"));
        }

        let now = Utc::now();
        let custom_sport = input.custom_sport.or_else(|| profile.custom_sport.clone());
        let turf = Turf {
            id: Uuid::new_v4(),
            owner_id: owner.id.clone(),
            name: input
                .name
                .or_else(|| profile.business_name.clone())
                .unwrap_or_default()
                .trim()
                .to_string(),
            description: input
                .description
                .or_else(|| profile.about.clone())
                .unwrap_or_default(),
            images: input.images,
            sports: input.sports.unwrap_or_else(|| profile.sports.clone()),
            custom_sport: custom_sport.filter(|c| !c.trim().is_empty()),
            amenities: input.amenities.unwrap_or_else(|| profile.amenities.clone()),
            slots: input.slots.unwrap_or_else(|| profile.slots.clone()),
            price_per_hour: input
                .price_per_hour
                .or(profile.pricing)
                .unwrap_or(Decimal::ZERO),
            location: input
                .location
                .or_else(|| profile.location.clone())
                .unwrap_or_default(),
            contact: contact_of(owner),
            payment_qr: profile.payment_qr.clone(),
            is_active: true,
            rating: Decimal::ZERO,
            review_count: 0,
            created_at: now,
            updated_at: now,
        };
        turf.validate()?;

        let turf = self.store.insert_turf(turf).await?;
        tracing::info!(turf_id = %turf.id, owner_id = %turf.owner_id, "Turf created");
        Ok(turf)
    }

    /// Partial update by the owning owner
    pub async fn update_turf(
        &self,
        owner: &Account,
        turf_id: Uuid,
        input: UpdateTurfInput,
    ) -> AppResult<Turf> {
        input.validate()?;

        let mut turf = self
            .store
            .get_turf(turf_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Turf".into()))?;

        if turf.owner_id != owner.id {
            return Err(AppError::Forbidden("You do not own this turf".into()));
        }

        if let Some(name) = input.name {
            turf.name = name.trim().to_string();
        }
        if let Some(description) = input.description {
            turf.description = description;
        }
        if let Some(images) = input.images {
            turf.images = images;
        }
        if let Some(sports) = input.sports {
            turf.sports = sports;
        }
        if let Some(custom) = input.custom_sport {
            turf.custom_sport = Some(custom).filter(|c| !c.trim().is_empty());
        }
        if let Some(amenities) = input.amenities {
            turf.amenities = amenities;
        }
        if let Some(slots) = input.slots {
            turf.slots = slots;
        }
        if let Some(price) = input.price_per_hour {
            turf.price_per_hour = price;
        }
        if let Some(location) = input.location {
            turf.location = location;
        }
        if let Some(active) = input.is_active {
            turf.is_active = active;
        }
        turf.contact = contact_of(owner);
        turf.updated_at = Utc::now();
        turf.validate()?;

        let turf = self.store.update_turf(turf).await?;
        tracing::info!(turf_id = %turf.id, "Turf updated");
        Ok(turf)
    }

    /// The owner's turfs (at most one today)
    pub async fn list_owner_turfs(&self, owner: &Account) -> AppResult<Vec<Turf>> {
        if !owner.is_owner() {
            return Err(AppError::Forbidden("Only turf owners have turfs".into()));
        }
        Ok(self
            .store
            .find_turf_by_owner(&owner.id)
            .await?
            .into_iter()
            .collect())
    }
}
