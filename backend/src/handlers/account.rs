//! Account and owner profile HTTP handlers

use axum::{
    extract::{Multipart, State},
    Json,
};
use shared::{Account, ProfileCompleteness};

use super::upload::{next_field, read_upload};
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::CurrentUser;
use crate::services::account::{OwnerProfileInput, UpdateProfileInput};
use crate::services::AccountService;
use crate::AppState;

fn service(state: &AppState) -> AccountService {
    AccountService::new(state.store.clone(), state.media.clone(), state.config.clone())
}

/// The caller's account, created on first contact by the auth middleware
pub async fn get_me(current_user: CurrentUser) -> Json<Account> {
    Json(current_user.0.account)
}

pub async fn update_me(
    State(state): State<AppState>,
    current_user: CurrentUser,
    AppJson(input): AppJson<UpdateProfileInput>,
) -> AppResult<Json<Account>> {
    let account = service(&state)
        .update_profile(&current_user.0.account, input)
        .await?;
    Ok(Json(account))
}

/// Save owner details and become an owner
pub async fn save_owner_profile(
    State(state): State<AppState>,
    current_user: CurrentUser,
    AppJson(input): AppJson<OwnerProfileInput>,
) -> AppResult<Json<Account>> {
    let account = service(&state)
        .save_owner_profile(&current_user.0.account, input)
        .await?;
    Ok(Json(account))
}

pub async fn get_profile_completeness(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> Json<ProfileCompleteness> {
    Json(service(&state).completeness(&current_user.0.account))
}

pub async fn upload_payment_qr(
    State(state): State<AppState>,
    current_user: CurrentUser,
    mut multipart: Multipart,
) -> AppResult<Json<Account>> {
    let mut file = None;
    while let Some(field) = next_field(&mut multipart).await? {
        if field.name() == Some("file") {
            file = Some(read_upload(field).await?);
        }
    }
    let file = file.ok_or_else(|| AppError::validation("file", "File is required"))?;

    let account = service(&state)
        .upload_payment_qr(&current_user.0.account, file)
        .await?;
    Ok(Json(account))
}
