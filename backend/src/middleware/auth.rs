//! Authentication middleware
//!
//! Verifies the bearer credential, resolves (or on first contact creates) the
//! caller's account, and stores it in the request extensions.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use shared::Account;

use crate::error::{AppError, AppResult};
use crate::services::AccountService;
use crate::AppState;

/// Authenticated account attached to a request
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub account: Account,
}

async fn authenticate(state: &AppState, bearer: &Bearer) -> AppResult<AuthUser> {
    let identity = state.identity.verify(bearer.token()).await?;
    let account = AccountService::new(state.store.clone(), state.media.clone(), state.config.clone())
        .resolve(&identity)
        .await?;
    Ok(AuthUser { account })
}

/// Rejects requests without a valid bearer credential
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(TypedHeader(Authorization(bearer))) = bearer else {
        return AppError::InvalidCredential("Missing or invalid Authorization header".into())
            .into_response();
    };

    match authenticate(&state, &bearer).await {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

/// Attaches the caller when a credential is present; anonymous requests pass
/// through, invalid credentials are still rejected
pub async fn optional_auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(TypedHeader(Authorization(bearer))) = bearer {
        match authenticate(&state, &bearer).await {
            Ok(user) => {
                request.extensions_mut().insert(user);
            }
            Err(e) => return e.into_response(),
        }
    }
    next.run(request).await
}

/// Extractor for authenticated user
/// Use this in handlers to get the current user
#[derive(Clone, Debug)]
pub struct CurrentUser(pub AuthUser);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| AppError::InvalidCredential("Authentication required".into()))
    }
}

/// Extractor for routes that serve both anonymous and signed-in callers
#[derive(Clone, Debug)]
pub struct MaybeUser(pub Option<AuthUser>);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(parts.extensions.get::<AuthUser>().cloned()))
    }
}
