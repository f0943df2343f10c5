//! Request extractors whose rejections render as `AppError`
//!
//! Malformed JSON, query strings and path segments become `VALIDATION_ERROR`
//! responses naming the offending field where serde reports one.

use axum::extract::{
    rejection::{JsonRejection, PathRejection, QueryRejection},
    FromRequest, FromRequestParts,
};

use crate::error::AppError;

/// JSON body extractor
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Query string extractor
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

/// Path parameter extractor
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

/// Field named in a serde message such as `sports[0]: unknown variant ...`
/// or `missing field `status``
fn reported_field(text: &str) -> Option<String> {
    // Drop axum's "Failed to ...: " prefix
    let detail = text.split_once(": ").map_or(text, |(_, rest)| rest);

    if let Some((path, _)) = detail.split_once(": ") {
        let head = path.split(['[', '.']).next().unwrap_or_default().trim();
        if !head.is_empty() && head.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Some(head.to_string());
        }
    }

    detail
        .split_once("missing field `")
        .and_then(|(_, rest)| rest.split_once('`'))
        .map(|(field, _)| field.to_string())
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let text = rejection.body_text();
        let field = reported_field(&text).unwrap_or_else(|| "body".to_string());
        AppError::Validation {
            field,
            message: text,
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        let text = rejection.body_text();
        let field = reported_field(&text).unwrap_or_else(|| "query".to_string());
        AppError::Validation {
            field,
            message: text,
        }
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::validation("id", rejection.body_text())
    }
}
