//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod invite_repo;
pub mod link_repo;
pub mod message_repo;
pub mod profile_repo;
pub mod project_repo;
pub mod thread_repo;

pub use invite_repo::InviteRepo;
pub use link_repo::{ProjectTradeLinkRepo, RolodexLinkRepo};
pub use message_repo::MessageRepo;
pub use profile_repo::ProfileRepo;
pub use project_repo::ProjectRepo;
pub use thread_repo::ThreadRepo;
