//! Booking workflow HTTP handlers

use std::str::FromStr;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use shared::{BookingDetails, PaginatedResponse};
use uuid::Uuid;

use super::upload::{next_field, read_text, read_upload};
use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::CurrentUser;
use crate::services::booking::{CreateBookingInput, DecisionInput, ListBookingsQuery};
use crate::services::BookingService;
use crate::AppState;

fn service(state: &AppState) -> BookingService {
    BookingService::new(state.store.clone(), state.media.clone(), state.config.clone())
}

/// Collect the booking form: slot fields, amount and the payment proof file
async fn read_booking_form(mut multipart: Multipart) -> AppResult<CreateBookingInput> {
    let mut input = CreateBookingInput::default();

    while let Some(field) = next_field(&mut multipart).await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("payment_proof") => input.payment_proof = Some(read_upload(field).await?),
            Some("turf_id") => {
                let raw = read_text(field).await?;
                let id = Uuid::parse_str(raw.trim())
                    .map_err(|_| AppError::validation("turf_id", "Turf id must be a UUID"))?;
                input.turf_id = Some(id);
            }
            Some("owner_id") => input.owner_id = Some(read_text(field).await?),
            Some("date") => input.slot.date = read_text(field).await?,
            Some("day") => input.slot.day = Some(read_text(field).await?),
            Some("start_time") => input.slot.start_time = read_text(field).await?,
            Some("end_time") => input.slot.end_time = read_text(field).await?,
            Some("amount") => {
                let raw = read_text(field).await?;
                let amount = Decimal::from_str(raw.trim())
                    .map_err(|_| AppError::validation("amount", "Amount must be a number"))?;
                input.amount = Some(amount);
            }
            _ => {}
        }
    }

    Ok(input)
}

/// Request a slot; the payment proof is uploaded with the request
pub async fn create_booking(
    State(state): State<AppState>,
    current_user: CurrentUser,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<BookingDetails>)> {
    let input = read_booking_form(multipart).await?;
    let booking = service(&state)
        .create_booking(&current_user.0.account, input)
        .await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

/// Bookings the caller made
pub async fn list_my_bookings(
    State(state): State<AppState>,
    current_user: CurrentUser,
    AppQuery(query): AppQuery<ListBookingsQuery>,
) -> AppResult<Json<PaginatedResponse<BookingDetails>>> {
    let page = service(&state)
        .list_for_customer(&current_user.0.account, query)
        .await?;
    Ok(Json(page))
}

/// Bookings received by the caller's turf
pub async fn list_owner_bookings(
    State(state): State<AppState>,
    current_user: CurrentUser,
    AppQuery(query): AppQuery<ListBookingsQuery>,
) -> AppResult<Json<PaginatedResponse<BookingDetails>>> {
    let page = service(&state)
        .list_for_owner(&current_user.0.account, query)
        .await?;
    Ok(Json(page))
}

pub async fn get_booking(
    State(state): State<AppState>,
    current_user: CurrentUser,
    AppPath(booking_id): AppPath<Uuid>,
) -> AppResult<Json<BookingDetails>> {
    let booking = service(&state)
        .get_booking(&current_user.0.account, booking_id)
        .await?;
    Ok(Json(booking))
}

/// Confirm or reject a pending booking
pub async fn decide_booking(
    State(state): State<AppState>,
    current_user: CurrentUser,
    AppPath(booking_id): AppPath<Uuid>,
    AppJson(input): AppJson<DecisionInput>,
) -> AppResult<Json<BookingDetails>> {
    let decision = input.decision()?;
    let booking = service(&state)
        .decide(&current_user.0.account, booking_id, decision)
        .await?;
    Ok(Json(booking))
}
