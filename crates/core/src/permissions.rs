//! Share roles, entity operations, and the caller's permission context.
//!
//! A share grants a user a role on one entity. A role resolves to a fixed
//! operation set per entity type. Shares on a namespace apply the same role
//! to everything beneath it: sub-namespaces, lists, and campaigns. The
//! resolved operations are materialised in the `permissions` table by the
//! share repository, and every check reads from that cache.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Entity types
// ---------------------------------------------------------------------------

/// Entity types that can be shared and permission-checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Namespace,
    List,
    Campaign,
}

impl EntityType {
    pub const ALL: [EntityType; 3] = [Self::Namespace, Self::List, Self::Campaign];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Namespace => "namespace",
            Self::List => "list",
            Self::Campaign => "campaign",
        }
    }

    /// Table holding entities of this type.
    pub fn table(self) -> &'static str {
        match self {
            Self::Namespace => "namespaces",
            Self::List => "lists",
            Self::Campaign => "campaigns",
        }
    }

    /// Column pointing at the namespace that owns an entity of this type.
    pub fn owner_column(self) -> &'static str {
        match self {
            Self::Namespace => "parent",
            Self::List | Self::Campaign => "namespace",
        }
    }

    /// Every operation defined for this entity type.
    pub fn operations(self) -> &'static [&'static str] {
        match self {
            Self::Namespace => NAMESPACE_OPERATIONS,
            Self::List => LIST_OPERATIONS,
            Self::Campaign => CAMPAIGN_OPERATIONS,
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "namespace" => Ok(Self::Namespace),
            "list" => Ok(Self::List),
            "campaign" => Ok(Self::Campaign),
            other => Err(CoreError::Validation(format!(
                "Unknown entity type: '{other}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

pub const OP_VIEW: &str = "view";
pub const OP_EDIT: &str = "edit";
pub const OP_DELETE: &str = "delete";
pub const OP_SHARE: &str = "share";

pub const OP_CREATE_NAMESPACE: &str = "createNamespace";
pub const OP_CREATE_LIST: &str = "createList";
pub const OP_CREATE_CAMPAIGN: &str = "createCampaign";

pub const OP_VIEW_SUBSCRIPTIONS: &str = "viewSubscriptions";
pub const OP_MANAGE_SUBSCRIPTIONS: &str = "manageSubscriptions";

pub const OP_VIEW_STATS: &str = "viewStats";
pub const OP_VIEW_FILES: &str = "viewFiles";
pub const OP_VIEW_ATTACHMENTS: &str = "viewAttachments";
pub const OP_VIEW_TRIGGERS: &str = "viewTriggers";

const NAMESPACE_OPERATIONS: &[&str] = &[
    OP_VIEW,
    OP_EDIT,
    OP_DELETE,
    OP_SHARE,
    OP_CREATE_NAMESPACE,
    OP_CREATE_LIST,
    OP_CREATE_CAMPAIGN,
];

const LIST_OPERATIONS: &[&str] = &[
    OP_VIEW,
    OP_EDIT,
    OP_DELETE,
    OP_SHARE,
    OP_VIEW_SUBSCRIPTIONS,
    OP_MANAGE_SUBSCRIPTIONS,
];

const CAMPAIGN_OPERATIONS: &[&str] = &[
    OP_VIEW,
    OP_EDIT,
    OP_DELETE,
    OP_SHARE,
    OP_VIEW_STATS,
    OP_VIEW_FILES,
    OP_VIEW_ATTACHMENTS,
    OP_VIEW_TRIGGERS,
];

// ---------------------------------------------------------------------------
// Share roles
// ---------------------------------------------------------------------------

pub const SHARE_ROLE_MASTER: &str = "master";
pub const SHARE_ROLE_EDITOR: &str = "editor";
pub const SHARE_ROLE_VIEWER: &str = "viewer";

/// All valid share roles.
pub const VALID_SHARE_ROLES: &[&str] = &[SHARE_ROLE_MASTER, SHARE_ROLE_EDITOR, SHARE_ROLE_VIEWER];

/// Validate that a share role string is one of the known roles.
pub fn validate_share_role(role: &str) -> Result<(), CoreError> {
    if VALID_SHARE_ROLES.contains(&role) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Unknown share role: '{role}'. Valid roles: {}",
            VALID_SHARE_ROLES.join(", ")
        )))
    }
}

/// Operations a share `role` grants on an entity of `entity_type`.
///
/// Unknown roles grant nothing.
pub fn role_operations(entity_type: EntityType, role: &str) -> &'static [&'static str] {
    match (entity_type, role) {
        (_, SHARE_ROLE_MASTER) => entity_type.operations(),
        (EntityType::Namespace, SHARE_ROLE_EDITOR) => {
            &[OP_VIEW, OP_EDIT, OP_CREATE_LIST, OP_CREATE_CAMPAIGN]
        }
        (EntityType::List, SHARE_ROLE_EDITOR) => &[
            OP_VIEW,
            OP_EDIT,
            OP_VIEW_SUBSCRIPTIONS,
            OP_MANAGE_SUBSCRIPTIONS,
        ],
        (EntityType::Campaign, SHARE_ROLE_EDITOR) => &[
            OP_VIEW,
            OP_EDIT,
            OP_VIEW_STATS,
            OP_VIEW_FILES,
            OP_VIEW_ATTACHMENTS,
            OP_VIEW_TRIGGERS,
        ],
        (EntityType::List, SHARE_ROLE_VIEWER) => &[OP_VIEW, OP_VIEW_SUBSCRIPTIONS],
        (EntityType::Campaign, SHARE_ROLE_VIEWER) => &[OP_VIEW, OP_VIEW_STATS],
        (EntityType::Namespace, SHARE_ROLE_VIEWER) => &[OP_VIEW],
        _ => &[],
    }
}

/// Validate that every operation in `ops` exists for `entity_type`.
pub fn validate_operations(entity_type: EntityType, ops: &[String]) -> Result<(), CoreError> {
    let known = entity_type.operations();
    match ops.iter().find(|op| !known.contains(&op.as_str())) {
        None => Ok(()),
        Some(op) => Err(CoreError::Validation(format!(
            "Unknown operation '{op}' for entity type '{entity_type}'"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Caller context
// ---------------------------------------------------------------------------

/// The identity every permission check runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionContext {
    pub user_id: DbId,
    /// Global administrators bypass share checks entirely.
    pub is_admin: bool,
}

impl PermissionContext {
    pub fn user(user_id: DbId) -> Self {
        Self {
            user_id,
            is_admin: false,
        }
    }

    pub fn admin(user_id: DbId) -> Self {
        Self {
            user_id,
            is_admin: true,
        }
    }
}
