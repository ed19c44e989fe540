// handlers/protected/mod.rs - Protected handlers (bearer token required)
//
// Every route here sits behind `middleware::require_auth`, so handlers can
// take `Extension<AuthUser>` and trust it. Movie handlers scope every store
// call to that user.

pub mod auth;
pub mod movies;
