use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::database::models::User;
use crate::error::ApiError;

/// Every token failure surfaces with the same message
const ACCESS_DENIED: &str = "Access denied. Invalid or missing token.";

/// Authenticated user resolved from the bearer token
#[derive(Clone, Debug)]
pub struct AuthUser(pub User);

/// Bearer token authentication; injects `AuthUser` for downstream handlers
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(request.headers()).map_err(|reason| {
        tracing::debug!("Rejected request: {}", reason);
        ApiError::unauthorized(ACCESS_DENIED)
    })?;

    let user_id = state
        .tokens
        .verify(token)
        .map_err(|_| ApiError::unauthorized(ACCESS_DENIED))?;

    // A valid token for a deleted account is still a failed authentication
    let user = state.store.find_user_by_id(user_id).await?.ok_or_else(|| {
        tracing::debug!("Token subject {} no longer exists", user_id);
        ApiError::unauthorized(ACCESS_DENIED)
    })?;

    request.extensions_mut().insert(AuthUser(user));
    Ok(next.run(request).await)
}

/// Extract the token from an `Authorization: Bearer <token>` header
fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, &'static str> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or("missing Authorization header")?
        .to_str()
        .map_err(|_| "Authorization header is not valid ASCII")?;

    let token = value
        .strip_prefix("Bearer ")
        .ok_or("Authorization header must use the Bearer scheme")?
        .trim();

    if token.is_empty() {
        return Err("empty bearer token");
    }
    Ok(token)
}
