//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods. Plain
//! lookups accept `&PgPool`; operations that enforce permissions also take
//! the caller's [`PermissionContext`](campaigner_core::permissions::PermissionContext)
//! and run in their own transaction.

pub mod campaign_repo;
pub mod list_repo;
pub mod namespace_repo;
pub mod share_repo;
pub mod user_repo;

mod table;

pub use campaign_repo::CampaignRepo;
pub use list_repo::ListRepo;
pub use namespace_repo::NamespaceRepo;
pub use share_repo::ShareRepo;
pub use user_repo::UserRepo;
