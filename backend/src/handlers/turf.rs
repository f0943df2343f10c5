//! Turf listing HTTP handlers

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use shared::{Turf, TurfQueryParams, TurfSearchResult};
use uuid::Uuid;

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::{CurrentUser, MaybeUser};
use crate::services::booking::{AvailabilityQuery, TurfAvailability};
use crate::services::turf::{CreateTurfInput, UpdateTurfInput};
use crate::services::{BookingService, TurfService};
use crate::AppState;

fn service(state: &AppState) -> TurfService {
    TurfService::new(state.store.clone(), state.config.clone())
}

/// Public listing search with filters, sorting and facets
pub async fn search_turfs(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<TurfQueryParams>,
) -> AppResult<Json<TurfSearchResult>> {
    let result = service(&state).search(params).await?;
    Ok(Json(result))
}

pub async fn get_turf(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    AppPath(turf_id): AppPath<Uuid>,
) -> AppResult<Json<Turf>> {
    let turf = service(&state)
        .get_turf(turf_id, viewer.as_ref().map(|u| &u.account))
        .await?;
    Ok(Json(turf))
}

/// Slot availability for a date range (default: the coming week)
pub async fn get_availability(
    State(state): State<AppState>,
    AppPath(turf_id): AppPath<Uuid>,
    AppQuery(query): AppQuery<AvailabilityQuery>,
) -> AppResult<Json<TurfAvailability>> {
    let service = BookingService::new(state.store.clone(), state.media.clone(), state.config.clone());
    let availability = service.availability(turf_id, query).await?;
    Ok(Json(availability))
}

pub async fn create_turf(
    State(state): State<AppState>,
    current_user: CurrentUser,
    AppJson(input): AppJson<CreateTurfInput>,
) -> AppResult<(StatusCode, Json<Turf>)> {
    let turf = service(&state)
        .create_turf(&current_user.0.account, input)
        .await?;
    Ok((StatusCode::CREATED, Json(turf)))
}

pub async fn update_turf(
    State(state): State<AppState>,
    current_user: CurrentUser,
    AppPath(turf_id): AppPath<Uuid>,
    AppJson(input): AppJson<UpdateTurfInput>,
) -> AppResult<Json<Turf>> {
    let turf = service(&state)
        .update_turf(&current_user.0.account, turf_id, input)
        .await?;
    Ok(Json(turf))
}

pub async fn list_owner_turfs(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Turf>>> {
    let turfs = service(&state)
        .list_owner_turfs(&current_user.0.account)
        .await?;
    Ok(Json(turfs))
}
