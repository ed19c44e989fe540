// handlers/public/auth/mod.rs - Public authentication handlers
//
// Both endpoints answer with the same payload: a confirmation message, the
// public view of the account and a fresh bearer token.

use serde::Serialize;

use crate::database::models::UserSummary;

pub mod login;    // POST /api/auth/login
pub mod register; // POST /api/auth/register

pub use login::login_post;
pub use register::register_post;

#[derive(Debug, Serialize)]
pub struct AuthPayload {
    pub message: &'static str,
    pub user: UserSummary,
    pub token: String,
}
