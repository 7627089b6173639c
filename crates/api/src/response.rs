//! Response envelopes.
//!
//! Reads respond with `{ "data": ... }`. Mutations add the cache tags they
//! invalidated so clients holding their own caches can drop the same
//! entries.

use serde::Serialize;
use sitelink_core::cache::{CacheTag, Mutation};

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// `{ "data": T, "invalidates": [...] }` envelope for mutations.
#[derive(Debug, Serialize)]
pub struct MutationResponse<T: Serialize> {
    pub data: T,
    pub invalidates: Vec<CacheTag>,
}

impl<T: Serialize> From<Mutation<T>> for MutationResponse<T> {
    fn from(mutation: Mutation<T>) -> Self {
        Self {
            data: mutation.value,
            invalidates: mutation.invalidates,
        }
    }
}
