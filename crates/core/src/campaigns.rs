//! Campaign enums and the presentation rules of the campaigns table.
//!
//! The table endpoint ships rows together with the action links the viewer
//! may follow, so the gating rules live here rather than in the client.

use serde::Serialize;

use crate::error::CoreError;
use crate::permissions::{
    OP_DELETE, OP_EDIT, OP_SHARE, OP_VIEW_ATTACHMENTS, OP_VIEW_FILES, OP_VIEW_STATS,
    OP_VIEW_TRIGGERS,
};
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum CampaignType {
    Regular = 1,
    Rss = 2,
    RssEntry = 3,
    Triggered = 4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum CampaignStatus {
    Idle = 1,
    Scheduled = 2,
    Paused = 3,
    Finished = 4,
    Inactive = 5,
    Active = 6,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum CampaignSource {
    Template = 1,
    Custom = 2,
    CustomFromTemplate = 3,
    CustomFromCampaign = 4,
    Url = 5,
}

impl TryFrom<i32> for CampaignType {
    type Error = CoreError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Regular),
            2 => Ok(Self::Rss),
            3 => Ok(Self::RssEntry),
            4 => Ok(Self::Triggered),
            other => Err(CoreError::Validation(format!(
                "Unknown campaign type: {other}"
            ))),
        }
    }
}

impl TryFrom<i32> for CampaignStatus {
    type Error = CoreError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Idle),
            2 => Ok(Self::Scheduled),
            3 => Ok(Self::Paused),
            4 => Ok(Self::Finished),
            5 => Ok(Self::Inactive),
            6 => Ok(Self::Active),
            other => Err(CoreError::Validation(format!(
                "Unknown campaign status: {other}"
            ))),
        }
    }
}

impl TryFrom<i32> for CampaignSource {
    type Error = CoreError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Template),
            2 => Ok(Self::Custom),
            3 => Ok(Self::CustomFromTemplate),
            4 => Ok(Self::CustomFromCampaign),
            5 => Ok(Self::Url),
            other => Err(CoreError::Validation(format!(
                "Unknown campaign source: {other}"
            ))),
        }
    }
}

impl CampaignSource {
    /// Whether the campaign carries its own editable content.
    pub fn is_custom(self) -> bool {
        matches!(
            self,
            Self::Custom | Self::CustomFromTemplate | Self::CustomFromCampaign
        )
    }
}

impl CampaignStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Scheduled => "Scheduled",
            Self::Paused => "Paused",
            Self::Finished => "Finished",
            Self::Inactive => "Inactive",
            Self::Active => "Active",
        }
    }
}

/// Display label for a campaign status.
///
/// A scheduled campaign reads "Sending scheduled" until its start time has
/// passed, then "Sending".
pub fn status_label(
    status: CampaignStatus,
    scheduled: Option<Timestamp>,
    now: Timestamp,
) -> &'static str {
    match status {
        CampaignStatus::Scheduled => match scheduled {
            Some(at) if at > now => "Sending scheduled",
            _ => "Sending",
        },
        other => other.label(),
    }
}

// ---------------------------------------------------------------------------
// Row actions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Status,
    Edit,
    Content,
    Files,
    Attachments,
    Triggers,
    Share,
    Delete,
}

/// A link rendered in the actions column of the campaigns table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowAction {
    pub kind: ActionKind,
    pub link: String,
}

/// Actions the viewer may take on one campaign row.
///
/// Every action is gated by an operation in `permissions`; an operation the
/// set lacks never yields its action.
pub fn row_actions(
    id: DbId,
    campaign_type: CampaignType,
    source: CampaignSource,
    permissions: &[String],
) -> Vec<RowAction> {
    let has = |op: &str| permissions.iter().any(|p| p == op);
    let link = |suffix: &str| format!("/campaigns/{id}/{suffix}");

    let mut actions = Vec::new();

    if has(OP_VIEW_STATS) {
        actions.push(RowAction {
            kind: ActionKind::Status,
            link: link("status"),
        });
    }
    if has(OP_EDIT) {
        actions.push(RowAction {
            kind: ActionKind::Edit,
            link: link("edit"),
        });
    }
    if has(OP_EDIT) && source.is_custom() {
        actions.push(RowAction {
            kind: ActionKind::Content,
            link: link("content"),
        });
    }
    if has(OP_VIEW_FILES) && source.is_custom() {
        actions.push(RowAction {
            kind: ActionKind::Files,
            link: link("files"),
        });
    }
    if has(OP_VIEW_ATTACHMENTS) {
        actions.push(RowAction {
            kind: ActionKind::Attachments,
            link: link("attachments"),
        });
    }
    if campaign_type == CampaignType::Triggered && has(OP_VIEW_TRIGGERS) {
        actions.push(RowAction {
            kind: ActionKind::Triggers,
            link: link("triggers"),
        });
    }
    if has(OP_SHARE) {
        actions.push(RowAction {
            kind: ActionKind::Share,
            link: link("share"),
        });
    }
    if has(OP_DELETE) {
        actions.push(RowAction {
            kind: ActionKind::Delete,
            link: format!("/rest/campaigns/{id}"),
        });
    }

    actions
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::permissions::{EntityType, OP_VIEW};

    fn perms(ops: &[&str]) -> Vec<String> {
        ops.iter().map(|s| s.to_string()).collect()
    }

    fn kinds(actions: &[RowAction]) -> Vec<ActionKind> {
        actions.iter().map(|a| a.kind).collect()
    }

    #[test]
    fn view_only_yields_no_actions() {
        let actions = row_actions(
            3,
            CampaignType::Regular,
            CampaignSource::Custom,
            &perms(&[OP_VIEW]),
        );
        assert!(actions.is_empty());
    }

    #[test]
    fn full_permissions_on_custom_triggered_campaign() {
        let all = perms(EntityType::Campaign.operations());
        let actions = row_actions(7, CampaignType::Triggered, CampaignSource::Custom, &all);
        assert_eq!(
            kinds(&actions),
            vec![
                ActionKind::Status,
                ActionKind::Edit,
                ActionKind::Content,
                ActionKind::Files,
                ActionKind::Attachments,
                ActionKind::Triggers,
                ActionKind::Share,
                ActionKind::Delete,
            ]
        );
        assert_eq!(actions[0].link, "/campaigns/7/status");
    }

    #[test]
    fn template_source_hides_content_and_files() {
        let all = perms(EntityType::Campaign.operations());
        let actions = row_actions(1, CampaignType::Regular, CampaignSource::Template, &all);
        let kinds = kinds(&actions);
        assert!(!kinds.contains(&ActionKind::Content));
        assert!(!kinds.contains(&ActionKind::Files));
        assert!(!kinds.contains(&ActionKind::Triggers));
    }

    #[test]
    fn triggers_require_both_type_and_permission() {
        let without = row_actions(
            1,
            CampaignType::Triggered,
            CampaignSource::Url,
            &perms(&[OP_VIEW_STATS]),
        );
        assert!(!kinds(&without).contains(&ActionKind::Triggers));
    }

    #[test]
    fn scheduled_label_depends_on_start_time() {
        let now = Utc::now();
        assert_eq!(
            status_label(CampaignStatus::Scheduled, Some(now + Duration::hours(1)), now),
            "Sending scheduled"
        );
        assert_eq!(
            status_label(CampaignStatus::Scheduled, Some(now - Duration::hours(1)), now),
            "Sending"
        );
        assert_eq!(status_label(CampaignStatus::Scheduled, None, now), "Sending");
        assert_eq!(status_label(CampaignStatus::Paused, None, now), "Paused");
    }

    #[test]
    fn unknown_enum_values_are_rejected() {
        assert!(CampaignType::try_from(0).is_err());
        assert!(CampaignStatus::try_from(7).is_err());
        assert!(CampaignSource::try_from(6).is_err());
        assert_eq!(CampaignSource::try_from(3).unwrap(), CampaignSource::CustomFromTemplate);
    }
}
