//! Mailing list entity model and DTOs.

use campaigner_core::error::CoreError;
use campaigner_core::hashing::entity_hash;
use campaigner_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::FromRow;
use validator::Validate;

/// A list row from the `lists` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct List {
    pub id: DbId,
    /// Public short identifier used in subscription URLs.
    pub cid: String,
    pub name: String,
    pub description: Option<String>,
    pub default_form: Option<DbId>,
    pub public_subscribe: bool,
    pub unsubscription_mode: i32,
    /// Cached count of active subscriptions.
    pub subscribers: i32,
    pub namespace: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// The mutable fields of a list. Only these take part in the entity hash,
/// and only these can be written by create and update.
#[derive(Debug, Serialize)]
struct ListHashFields<'a> {
    name: &'a str,
    description: Option<&'a str>,
    default_form: Option<DbId>,
    public_subscribe: bool,
    unsubscription_mode: i32,
    namespace: DbId,
}

impl List {
    /// Fingerprint of the list's mutable fields for optimistic concurrency.
    pub fn hash(&self) -> Result<String, CoreError> {
        entity_hash(&ListHashFields {
            name: &self.name,
            description: self.description.as_deref(),
            default_form: self.default_form,
            public_subscribe: self.public_subscribe,
            unsubscription_mode: self.unsubscription_mode,
            namespace: self.namespace,
        })
    }
}

/// A list together with the hash a later update must send back.
#[derive(Debug, Clone, Serialize)]
pub struct ListWithHash {
    #[serde(flatten)]
    pub list: List,
    pub hash: String,
}

/// DTO for creating a list.
///
/// Unknown JSON keys are ignored, so clients cannot set `cid` or `id`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateList {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub description: Option<String>,
    pub default_form: Option<DbId>,
    #[serde(default)]
    pub public_subscribe: bool,
    #[serde(default)]
    pub unsubscription_mode: i32,
    pub namespace: DbId,
}

/// DTO for updating a list. Replaces every mutable field.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateList {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub description: Option<String>,
    pub default_form: Option<DbId>,
    #[serde(default)]
    pub public_subscribe: bool,
    pub unsubscription_mode: i32,
    pub namespace: DbId,
    /// Hash of the list as the client last read it.
    #[serde(alias = "originalHash")]
    pub original_hash: String,
}

/// One row of the lists table listing.
#[derive(Debug, Clone, FromRow)]
pub struct ListTableRow {
    pub id: DbId,
    pub name: String,
    pub cid: String,
    pub subscribers: i32,
    pub description: Option<String>,
    pub namespace_name: String,
    pub permissions: Vec<String>,
}

impl ListTableRow {
    /// Positional layout: `[id, name, cid, subscribers, description, namespace, permissions]`.
    pub fn into_row(self) -> Vec<serde_json::Value> {
        vec![
            json!(self.id),
            json!(self.name),
            json!(self.cid),
            json!(self.subscribers),
            json!(self.description),
            json!(self.namespace_name),
            json!(self.permissions),
        ]
    }
}
