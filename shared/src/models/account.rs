//! Account and owner profile models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::catalog::{Amenity, Sport};
use super::slot::SlotTemplate;
use crate::types::{Location, MediaRef};
use crate::validation::FieldError;

/// Platform role of an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Owner,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Owner => "owner",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "customer" => Some(Role::Customer),
            "owner" => Some(Role::Owner),
            _ => None,
        }
    }
}

/// Any platform user, keyed by the identity provider's subject id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub name: String,
    /// Stored lowercase
    pub email: String,
    pub role: Role,
    pub phone: Option<String>,
    pub is_active: bool,
    pub email_verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_profile: Option<OwnerProfile>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn is_owner(&self) -> bool {
        self.role == Role::Owner
    }

    pub fn is_customer(&self) -> bool {
        self.role == Role::Customer
    }

    pub fn summary(&self) -> AccountSummary {
        AccountSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            business_name: self
                .owner_profile
                .as_ref()
                .and_then(|p| p.business_name.clone()),
        }
    }

    /// The owner profile, provided every mandatory field is filled in.
    ///
    /// The error names the first missing field.
    pub fn complete_owner_profile(&self) -> Result<&OwnerProfile, FieldError> {
        let profile = self
            .owner_profile
            .as_ref()
            .filter(|_| self.is_owner())
            .ok_or_else(|| FieldError::new("owner_profile", "Owner profile has not been set up"))?;

        match profile.missing_fields().first() {
            Some(field) => Err(FieldError::new(
                *field,
                format!("Owner profile is missing required field: {field}"),
            )),
            None => Ok(profile),
        }
    }
}

/// Owner-only attributes. Every field is optional while the owner fills the
/// profile in; completeness is checked separately.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OwnerProfile {
    pub business_name: Option<String>,
    pub sports: Vec<Sport>,
    pub custom_sport: Option<String>,
    pub amenities: Vec<Amenity>,
    pub about: Option<String>,
    /// Price per hour
    pub pricing: Option<Decimal>,
    pub slots: Vec<SlotTemplate>,
    pub location: Option<Location>,
    pub payment_qr: Option<MediaRef>,
}

fn blank(value: Option<&str>) -> bool {
    value.map(str::trim).map_or(true, str::is_empty)
}

impl OwnerProfile {
    /// Names of mandatory fields that are absent or empty, in display order
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();

        if blank(self.business_name.as_deref()) {
            missing.push("business_name");
        }
        if self.sports.is_empty() {
            missing.push("sports");
        }
        if self.sports.contains(&Sport::Other) && blank(self.custom_sport.as_deref()) {
            missing.push("custom_sport");
        }
        if self.amenities.is_empty() {
            missing.push("amenities");
        }
        if blank(self.about.as_deref()) {
            missing.push("about");
        }
        if !self.pricing.is_some_and(|p| p > Decimal::ZERO) {
            missing.push("pricing");
        }
        if self.slots.is_empty() {
            missing.push("slots");
        }
        if self
            .location
            .as_ref()
            .map_or(true, |l| l.address.trim().is_empty() || l.city.trim().is_empty())
        {
            missing.push("location");
        }
        if self
            .payment_qr
            .as_ref()
            .map_or(true, |qr| qr.url.trim().is_empty())
        {
            missing.push("payment_qr");
        }

        missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

/// Profile completeness report
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProfileCompleteness {
    pub complete: bool,
    pub missing: Vec<String>,
}

impl ProfileCompleteness {
    pub fn of(account: &Account) -> Self {
        let missing: Vec<String> = match (&account.owner_profile, account.is_owner()) {
            (Some(profile), true) => profile
                .missing_fields()
                .into_iter()
                .map(str::to_string)
                .collect(),
            _ => OwnerProfile::default()
                .missing_fields()
                .into_iter()
                .map(str::to_string)
                .collect(),
        };
        Self {
            complete: missing.is_empty(),
            missing,
        }
    }
}

/// Public view of an account used in booking read models
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountSummary {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
}
