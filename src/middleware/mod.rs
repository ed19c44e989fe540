pub mod auth;
pub mod errors;
pub mod rate_limit;
pub mod response;

pub use auth::{require_auth, AuthUser};
pub use errors::normalize_errors;
pub use rate_limit::{rate_limit, RateLimiter};
pub use response::{ApiResponse, ApiResult};
