//! Campaign entity model and DTOs.

use campaigner_core::campaigns::{row_actions, CampaignSource, CampaignType};
use campaigner_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::FromRow;
use validator::Validate;

/// A campaign row from the `campaigns` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Campaign {
    pub id: DbId,
    pub cid: String,
    pub name: String,
    pub description: Option<String>,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub campaign_type: i32,
    pub status: i32,
    pub scheduled: Option<Timestamp>,
    pub source: i32,
    pub list: Option<DbId>,
    pub namespace: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A campaign with its rendered status label.
#[derive(Debug, Clone, Serialize)]
pub struct CampaignDetail {
    #[serde(flatten)]
    pub campaign: Campaign,
    pub status_label: &'static str,
}

/// DTO for creating a campaign. New campaigns start out idle.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCampaign {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub campaign_type: i32,
    pub source: i32,
    pub list: Option<DbId>,
    pub namespace: DbId,
    pub scheduled: Option<Timestamp>,
}

/// One row of the campaigns table listing.
#[derive(Debug, Clone, FromRow)]
pub struct CampaignTableRow {
    pub id: DbId,
    pub name: String,
    pub cid: String,
    pub description: Option<String>,
    pub campaign_type: i32,
    pub status: i32,
    pub scheduled: Option<Timestamp>,
    pub source: i32,
    pub created_at: Timestamp,
    pub namespace_name: String,
    pub permissions: Vec<String>,
}

impl CampaignTableRow {
    /// Positional layout:
    ///
    /// ```text
    /// 0 id, 1 name, 2 cid, 3 description, 4 type, 5 status, 6 scheduled,
    /// 7 source, 8 created_at, 9 namespace, 10 permissions, 11 actions
    /// ```
    pub fn into_row(self) -> Vec<serde_json::Value> {
        let actions = match (
            CampaignType::try_from(self.campaign_type),
            CampaignSource::try_from(self.source),
        ) {
            (Ok(campaign_type), Ok(source)) => {
                row_actions(self.id, campaign_type, source, &self.permissions)
            }
            _ => Vec::new(),
        };

        vec![
            json!(self.id),
            json!(self.name),
            json!(self.cid),
            json!(self.description),
            json!(self.campaign_type),
            json!(self.status),
            json!(self.scheduled),
            json!(self.source),
            json!(self.created_at),
            json!(self.namespace_name),
            json!(self.permissions),
            json!(actions),
        ]
    }
}
