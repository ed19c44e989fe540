// handlers/public/auth/register.rs - POST /api/auth/register handler

use axum::extract::State;

use super::AuthPayload;
use crate::app::AppState;
use crate::auth::hash_password_blocking;
use crate::database::models::{NewUser, UserSummary};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::validation::{RegisterRequest, ValidatedJson};

const DUPLICATE_EMAIL: &str = "User already exists with this email";

/// Create an account and sign it in.
///
/// The up-front email lookup gives the common case a clean error; the unique
/// constraint in the store still catches concurrent registrations, which
/// surface as the same conflict.
pub async fn register_post(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> ApiResult<AuthPayload> {
    if state.store.find_user_by_email(&payload.email).await?.is_some() {
        return Err(ApiError::conflict(DUPLICATE_EMAIL));
    }

    let password_hash = hash_password_blocking(payload.password, state.config.security.bcrypt_cost).await?;

    let user = state
        .store
        .create_user(NewUser {
            name: payload.name,
            email: payload.email,
            password_hash,
            email_notifications: payload.email_notifications.unwrap_or(true),
        })
        .await?;

    tracing::info!("Registered user {}", user.id);
    state.notifier.welcome(&user);

    let token = state.tokens.issue(user.id)?;

    Ok(ApiResponse::created(AuthPayload {
        message: "User created successfully",
        user: UserSummary::from(&user),
        token,
    }))
}
