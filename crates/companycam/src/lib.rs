//! Client for the CompanyCam REST API (v2) and paginated sync helpers.

pub mod api;
pub mod models;
pub mod sync;

pub use api::{CompanyCamApi, CompanyCamError, DEFAULT_BASE_URL};
pub use models::ProjectFilters;
pub use sync::{SyncProgress, DEFAULT_PER_PAGE};
