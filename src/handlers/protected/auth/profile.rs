// handlers/protected/auth/profile.rs - GET /api/auth/profile handler

use axum::Extension;
use serde::Serialize;

use crate::database::models::UserSummary;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

#[derive(Debug, Serialize)]
pub struct ProfilePayload {
    pub user: UserSummary,
}

pub async fn profile_get(Extension(AuthUser(user)): Extension<AuthUser>) -> ApiResult<ProfilePayload> {
    Ok(ApiResponse::success(ProfilePayload {
        user: UserSummary::from(&user),
    }))
}
