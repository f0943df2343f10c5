//! Account and owner profile service

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{
    validate_about, validate_amenities, validate_phone, validate_positive_amount,
    validate_slot_templates, validate_sports, Account, Amenity, Location, MediaFolder, MediaRef,
    OwnerProfile, ProfileCompleteness, Role, SlotTemplate, Sport,
};
use validator::{Validate, ValidationError};

use crate::error::{AppError, AppResult};
use crate::identity::Identity;
use crate::media::{MediaStore, MediaUpload};
use crate::store::Store;
use crate::Config;

/// Account service for profile management
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn Store>,
    media: Arc<dyn MediaStore>,
    config: Arc<Config>,
}

fn phone_format(phone: &str) -> Result<(), ValidationError> {
    validate_phone(phone).map_err(|msg| {
        let mut err = ValidationError::new("phone");
        err.message = Some(msg.into());
        err
    })
}

/// Input for updating the basic profile
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileInput {
    #[validate(length(min = 1, max = 100, message = "Name must be 1 to 100 characters"))]
    pub name: Option<String>,
    #[validate(custom = "phone_format")]
    pub phone: Option<String>,
}

/// Input for saving owner details; omitted fields keep their stored value
#[derive(Debug, Default, Deserialize, Validate)]
pub struct OwnerProfileInput {
    #[validate(length(min = 1, max = 200, message = "Business name must be 1 to 200 characters"))]
    pub business_name: Option<String>,
    pub sports: Option<Vec<Sport>>,
    pub custom_sport: Option<String>,
    pub amenities: Option<Vec<Amenity>>,
    pub about: Option<String>,
    pub pricing: Option<Decimal>,
    pub slots: Option<Vec<SlotTemplate>>,
    pub location: Option<Location>,
    pub payment_qr: Option<MediaRef>,
}

impl OwnerProfileInput {
    /// Apply onto `profile`, validating every supplied field
    fn merge_into(self, profile: &mut OwnerProfile) -> AppResult<()> {
        self.validate()?;

        if let Some(name) = self.business_name {
            profile.business_name = Some(name.trim().to_string());
        }
        if let Some(about) = self.about {
            validate_about(&about).map_err(|msg| AppError::validation("about", msg))?;
            profile.about = Some(about);
        }
        if let Some(pricing) = self.pricing {
            validate_positive_amount(pricing).map_err(|msg| AppError::validation("pricing", msg))?;
            profile.pricing = Some(pricing);
        }
        if let Some(sports) = self.sports {
            profile.sports = sports;
        }
        if let Some(custom) = self.custom_sport {
            profile.custom_sport = Some(custom.trim().to_string()).filter(|c| !c.is_empty());
        }
        if !profile.sports.is_empty() {
            validate_sports(&profile.sports, profile.custom_sport.as_deref())?;
        }
        if let Some(amenities) = self.amenities {
            validate_amenities(&amenities)?;
            profile.amenities = amenities;
        }
        if let Some(slots) = self.slots {
            if !slots.is_empty() {
                validate_slot_templates(&slots)?;
            }
            profile.slots = slots;
        }
        if let Some(location) = self.location {
            location.validate()?;
            profile.location = Some(location);
        }
        if let Some(qr) = self.payment_qr {
            if qr.url.trim().is_empty() {
                return Err(AppError::validation("payment_qr", "QR code URL cannot be empty"));
            }
            profile.payment_qr = Some(qr);
        }
        Ok(())
    }
}

impl AccountService {
    pub fn new(store: Arc<dyn Store>, media: Arc<dyn MediaStore>, config: Arc<Config>) -> Self {
        Self {
            store,
            media,
            config,
        }
    }

    /// Find the caller's account, creating a customer account on first contact
    pub async fn resolve(&self, identity: &Identity) -> AppResult<Account> {
        if let Some(account) = self.store.get_account(&identity.subject_id).await? {
            return Self::ensure_active(account);
        }

        if self
            .store
            .find_account_by_email(&identity.email)
            .await?
            .is_some()
        {
            return Err(AppError::conflict(
                "email",
                "Email is already registered to another account",
            ));
        }

        let now = Utc::now();
        let account = Account {
            id: identity.subject_id.clone(),
            name: identity
                .name
                .clone()
                .unwrap_or_else(|| identity.email.split('@').next().unwrap_or_default().to_string()),
            email: identity.email.to_lowercase(),
            role: Role::Customer,
            phone: None,
            is_active: true,
            email_verified: identity.email_verified,
            owner_profile: None,
            created_at: now,
            updated_at: now,
        };

        match self.store.insert_account(account).await {
            Ok(account) => {
                tracing::info!(account_id = %account.id, "Account created on first contact");
                Ok(account)
            }
            // A concurrent first request for the same subject won the insert
            Err(AppError::Conflict { resource, .. }) if resource == "account" => self
                .store
                .get_account(&identity.subject_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Account".into()))
                .and_then(Self::ensure_active),
            Err(e) => Err(e),
        }
    }

    fn ensure_active(account: Account) -> AppResult<Account> {
        if account.is_active {
            Ok(account)
        } else {
            Err(AppError::Forbidden("Account is deactivated".into()))
        }
    }

    /// Update name and phone
    pub async fn update_profile(&self, account: &Account, input: UpdateProfileInput) -> AppResult<Account> {
        input.validate()?;

        let mut updated = account.clone();
        if let Some(name) = input.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(AppError::validation("name", "Name cannot be blank"));
            }
            updated.name = name;
        }
        if let Some(phone) = input.phone {
            updated.phone = Some(phone.trim().to_string());
        }
        updated.updated_at = Utc::now();

        self.store.update_account(updated).await
    }

    /// Save owner details and promote the account to owner.
    ///
    /// Partial profiles are accepted; completeness is checked when a turf is
    /// created.
    pub async fn save_owner_profile(
        &self,
        account: &Account,
        input: OwnerProfileInput,
    ) -> AppResult<Account> {
        let mut updated = account.clone();
        let mut profile = updated.owner_profile.take().unwrap_or_default();
        input.merge_into(&mut profile)?;

        if updated.role != Role::Owner {
            tracing::info!(account_id = %updated.id, "Account promoted to owner");
        }
        updated.role = Role::Owner;
        updated.owner_profile = Some(profile);
        updated.updated_at = Utc::now();

        self.store.update_account(updated).await
    }

    pub fn completeness(&self, account: &Account) -> ProfileCompleteness {
        ProfileCompleteness::of(account)
    }

    /// Upload a payment QR code and attach it to the owner profile and turf
    pub async fn upload_payment_qr(&self, account: &Account, file: MediaUpload) -> AppResult<Account> {
        if !account.is_owner() {
            return Err(AppError::Forbidden("Only turf owners can upload a payment QR".into()));
        }
        file.validate("file", self.config.media.max_upload_bytes)?;

        let qr = self.media.upload(file, MediaFolder::PaymentQr).await?;

        let mut updated = account.clone();
        let now = Utc::now();
        updated
            .owner_profile
            .get_or_insert_with(OwnerProfile::default)
            .payment_qr = Some(qr.clone());
        updated.updated_at = now;
        let updated = self.store.update_account(updated).await?;

        if let Some(mut turf) = self.store.find_turf_by_owner(&updated.id).await? {
            turf.payment_qr = Some(qr);
            turf.updated_at = now;
            self.store.update_turf(turf).await?;
        }

        Ok(updated)
    }
}
