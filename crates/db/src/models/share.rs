//! Share and permission-check DTOs.

use campaigner_core::permissions::EntityType;
use campaigner_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A share joined with the grantee's username.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ShareWithUser {
    pub user_id: DbId,
    pub username: String,
    pub role: String,
    pub created_at: Timestamp,
}

/// DTO for granting, changing, or revoking a share.
///
/// A `role` of `None` revokes the user's share on the entity.
#[derive(Debug, Clone, Deserialize)]
pub struct AssignShare {
    pub entity_type_id: EntityType,
    pub entity_id: DbId,
    pub user_id: DbId,
    pub role: Option<String>,
}

/// One named request of a permission check.
///
/// Without `entity_id` the check passes if the caller holds all
/// `required_operations` on any entity of the type.
#[derive(Debug, Clone, Deserialize)]
pub struct PermissionCheckRequest {
    pub entity_type_id: EntityType,
    pub entity_id: Option<DbId>,
    pub required_operations: Vec<String>,
}
