//! Entity models and DTOs.
//!
//! Row structs derive `FromRow` for the PostgreSQL repositories and serde
//! for the memory-store snapshot and HTTP responses.

pub mod invite;
pub mod link;
pub mod message;
pub mod profile;
pub mod project;
pub mod thread;
