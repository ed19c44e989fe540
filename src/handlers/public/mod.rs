// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition and liveness probes. Mounted under /api without the auth layer.

pub mod auth;
pub mod health;

pub use health::health_get;
