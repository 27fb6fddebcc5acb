//! Namespace entity model and DTOs.

use campaigner_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// The seeded root namespace. It has no parent and cannot be moved.
pub const ROOT_NAMESPACE_ID: DbId = 1;

/// A namespace row from the `namespaces` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Namespace {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub parent: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a namespace.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateNamespace {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub description: Option<String>,
    /// Defaults to the root namespace if omitted.
    pub parent: Option<DbId>,
}
