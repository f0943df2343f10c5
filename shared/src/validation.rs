//! Validation utilities for the turf booking marketplace

use rust_decimal::Decimal;
use thiserror::Error;

/// A validation failure tied to a single input field
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Maximum length of the owner "about" text
pub const MAX_ABOUT_LEN: usize = 1000;

/// Money columns are NUMERIC(12, 2)
pub const MAX_AMOUNT_SCALE: u32 = 2;
pub const MAX_AMOUNT_EXCLUSIVE: i64 = 10_000_000_000;

/// Maximum accepted upload size (5 MB)
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// MIME types accepted for turf images, QR codes and payment proofs
pub const ALLOWED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/png", "image/webp"];

// ============================================================================
// General Validations
// ============================================================================

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    let Some((local, domain)) = email.split_once('@') else {
        return Err("Invalid email format");
    };
    if local.is_empty() || !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.')
    {
        return Err("Invalid email format");
    }
    Ok(())
}

/// Validate phone number: optional leading `+`, separators allowed, 10-15 digits
pub fn validate_phone(phone: &str) -> Result<(), &'static str> {
    let trimmed = phone.trim();
    let body = trimmed.strip_prefix('+').unwrap_or(trimmed);
    if !body
        .chars()
        .all(|c| c.is_ascii_digit() || c == ' ' || c == '-')
    {
        return Err("Phone number may only contain digits, spaces and dashes");
    }
    let digits = body.chars().filter(|c| c.is_ascii_digit()).count();
    if !(10..=15).contains(&digits) {
        return Err("Phone number must have 10 to 15 digits");
    }
    Ok(())
}

/// Prices and amounts must be strictly positive and fit a two-decimal
/// money column with ten integer digits
pub fn validate_positive_amount(amount: Decimal) -> Result<(), &'static str> {
    if amount <= Decimal::ZERO {
        return Err("Amount must be greater than zero");
    }
    if amount.normalize().scale() > MAX_AMOUNT_SCALE {
        return Err("Amount may have at most 2 decimal places");
    }
    if amount >= Decimal::from(MAX_AMOUNT_EXCLUSIVE) {
        return Err("Amount must be less than 10000000000");
    }
    Ok(())
}

pub fn validate_about(about: &str) -> Result<(), &'static str> {
    if about.chars().count() > MAX_ABOUT_LEN {
        return Err("About text must be at most 1000 characters");
    }
    Ok(())
}

// ============================================================================
// Media Validations
// ============================================================================

/// Validate an image upload before it is sent to the media host
pub fn validate_image_upload(content_type: &str, size_bytes: usize) -> Result<(), &'static str> {
    if size_bytes == 0 {
        return Err("Uploaded file is empty");
    }
    if size_bytes > MAX_IMAGE_BYTES {
        return Err("Image must be 5 MB or smaller");
    }
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    if !ALLOWED_IMAGE_TYPES.contains(&mime.as_str()) {
        return Err("Only JPEG, PNG and WebP images are accepted");
    }
    Ok(())
}
