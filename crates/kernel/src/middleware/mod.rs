//! Request extractors and middleware.

pub mod bearer_auth;

pub use bearer_auth::BearerToken;
