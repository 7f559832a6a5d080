// crates/backend-lib/src/middleware/mod.rs

//! Middleware for the boathouse backend.

pub mod auth;
pub mod rate_limit;

pub use auth::require_auth;
pub use rate_limit::rate_limit;
