// handlers/protected/auth/mod.rs - Authenticated account endpoints

pub mod profile; // GET /api/auth/profile

pub use profile::profile_get;
