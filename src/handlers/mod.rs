// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) → Protected (bearer token required)

pub mod public;
pub mod protected;

use crate::error::ApiError;

/// Fallback for unmatched routes
pub async fn not_found() -> ApiError {
    ApiError::not_found("Route not found")
}
