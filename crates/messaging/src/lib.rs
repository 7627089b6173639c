//! Conversation, link and invite services.
//!
//! Every operation takes the [`EntityStore`](sitelink_db::EntityStore) as its
//! first argument and enforces the domain rules before writing. Mutations
//! return a [`Mutation`](sitelink_core::cache::Mutation) carrying the cache
//! tags they affected.

pub mod error;
pub mod invites;
pub mod links;
pub mod threads;

pub use error::{ServiceError, ServiceResult};
