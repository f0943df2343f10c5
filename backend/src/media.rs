//! Media host client
//!
//! Turf images, payment QR codes and payment proofs are stored on an external
//! Cloudinary-compatible host. Only the returned URL and object id are kept.

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use shared::{validate_image_upload, MediaFolder, MediaRef};

use crate::config::MediaConfig;
use crate::error::{AppError, AppResult};

/// A file received from a client, not yet uploaded
#[derive(Debug, Clone)]
pub struct MediaUpload {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub filename: String,
}

impl MediaUpload {
    /// Check type and size before anything leaves the server.
    ///
    /// `field` names the form field in the resulting validation error.
    pub fn validate(&self, field: &str, max_bytes: usize) -> AppResult<()> {
        if self.bytes.is_empty() {
            return Err(AppError::validation(field, "File is empty"));
        }
        if self.bytes.len() > max_bytes {
            return Err(AppError::validation(
                field,
                format!("File exceeds the {} byte limit", max_bytes),
            ));
        }
        validate_image_upload(&self.content_type, self.bytes.len())
            .map_err(|msg| AppError::validation(field, msg))
    }
}

#[axum::async_trait]
pub trait MediaStore: Send + Sync {
    async fn upload(&self, file: MediaUpload, folder: MediaFolder) -> AppResult<MediaRef>;
}

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

/// Signed uploads to a Cloudinary-style image API
pub struct CloudinaryMediaStore {
    client: reqwest::Client,
    config: MediaConfig,
}

impl CloudinaryMediaStore {
    pub fn new(config: MediaConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    fn upload_url(&self) -> String {
        format!(
            "{}/{}/image/upload",
            self.config.base_url.trim_end_matches('/'),
            self.config.cloud_name
        )
    }
}

/// Signature over the sorted upload parameters followed by the API secret
pub fn sign_upload(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted: Vec<_> = params.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(joined.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[axum::async_trait]
impl MediaStore for CloudinaryMediaStore {
    async fn upload(&self, file: MediaUpload, folder: MediaFolder) -> AppResult<MediaRef> {
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = sign_upload(
            &[("folder", folder.as_str()), ("timestamp", &timestamp)],
            &self.config.api_secret,
        );

        let part = Part::bytes(file.bytes)
            .file_name(file.filename)
            .mime_str(&file.content_type)
            .map_err(|e| AppError::validation("file", e.to_string()))?;

        let form = Form::new()
            .part("file", part)
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", folder.as_str())
            .text("signature", signature)
            .text("signature_algorithm", "sha256");

        let response = self
            .client
            .post(self.upload_url())
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::upstream("media", "Upload timed out")
                } else {
                    AppError::upstream("media", e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::upstream(
                "media",
                format!("Upload rejected with {}: {}", status, body),
            ));
        }

        let uploaded: UploadResponse = response
            .json()
            .await
            .map_err(|e| AppError::upstream("media", format!("Unreadable upload response: {}", e)))?;

        tracing::debug!(folder = folder.as_str(), object_id = %uploaded.public_id, "Media uploaded");

        Ok(MediaRef::new(uploaded.secure_url, uploaded.public_id))
    }
}
