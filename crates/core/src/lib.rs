//! Domain rules shared by every SiteLink crate.
//!
//! Nothing in here performs I/O: the store, services and HTTP layer all
//! depend on these types so that thread rules, role checks and cache tags
//! are defined exactly once.

#[macro_use]
mod macros;

pub mod cache;
pub mod error;
pub mod invites;
pub mod roles;
pub mod threads;
pub mod types;
