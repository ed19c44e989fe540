// handlers/public/auth/login.rs - POST /api/auth/login handler

use axum::extract::State;

use super::AuthPayload;
use crate::app::AppState;
use crate::auth::{verify_password_blocking, verify_password_unknown_user};
use crate::database::models::UserSummary;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::validation::{LoginRequest, ValidatedJson};

/// Unknown email and wrong password are indistinguishable to the client
const INVALID_CREDENTIALS: &str = "Invalid email or password";

pub async fn login_post(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> ApiResult<AuthPayload> {
    let Some(user) = state.store.find_user_by_email(&payload.email).await? else {
        verify_password_unknown_user(payload.password, state.config.security.bcrypt_cost).await;
        tracing::info!("Login failed: unknown email");
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    };

    if !verify_password_blocking(payload.password, user.password_hash.clone()).await {
        tracing::info!("Login failed for user {}", user.id);
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    }

    let token = state.tokens.issue(user.id)?;
    tracing::info!("User {} logged in", user.id);

    Ok(ApiResponse::success(AuthPayload {
        message: "Login successful",
        user: UserSummary::from(&user),
        token,
    }))
}
