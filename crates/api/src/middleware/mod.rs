//! Request extractors.
//!
//! - [`auth::AuthUser`] -- the caller, from a JWT Bearer token.

pub mod auth;
