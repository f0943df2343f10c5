//! Route definitions for the turf booking marketplace

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::{
    handlers,
    middleware::{auth_middleware, optional_auth_middleware},
    AppState,
};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Public listing routes
        .merge(public_turf_routes(state.clone()))
        // Protected routes - profile management
        .nest("/me", profile_routes(state.clone()))
        // Protected routes - listing management
        .merge(owner_turf_routes(state.clone()))
        // Protected routes - bookings
        .merge(booking_routes(state.clone()))
        // Protected routes - media
        .merge(upload_routes(state))
}

/// Listing search, detail and availability (credential optional)
fn public_turf_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/turfs", get(handlers::search_turfs))
        .route("/turfs/:turf_id", get(handlers::get_turf))
        .route("/turfs/:turf_id/availability", get(handlers::get_availability))
        .route_layer(middleware::from_fn_with_state(state, optional_auth_middleware))
}

/// Profile routes (protected)
fn profile_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::get_me).put(handlers::update_me))
        .route("/owner-profile", put(handlers::save_owner_profile))
        .route(
            "/owner-profile/completeness",
            get(handlers::get_profile_completeness),
        )
        .route("/payment-qr", post(handlers::upload_payment_qr))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Listing management routes (protected)
fn owner_turf_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/turfs", post(handlers::create_turf))
        .route("/turfs/:turf_id", put(handlers::update_turf))
        .route("/owner/turfs", get(handlers::list_owner_turfs))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Booking routes (protected)
fn booking_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/bookings",
            get(handlers::list_my_bookings).post(handlers::create_booking),
        )
        .route("/bookings/:booking_id", get(handlers::get_booking))
        .route("/bookings/:booking_id/decision", post(handlers::decide_booking))
        .route("/owner/bookings", get(handlers::list_owner_bookings))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Media upload routes (protected)
fn upload_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/uploads", post(handlers::upload_media))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
