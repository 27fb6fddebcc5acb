//! Repository for the `campaigns` table.

use campaigner_core::campaigns::{status_label, CampaignSource, CampaignStatus, CampaignType};
use campaigner_core::cid;
use campaigner_core::error::CoreError;
use campaigner_core::permissions::{
    EntityType, PermissionContext, OP_CREATE_CAMPAIGN, OP_DELETE, OP_VIEW,
};
use campaigner_core::table::{TableParams, TableResponse};
use campaigner_core::types::DbId;
use sqlx::PgPool;
use validator::Validate;

use crate::error::RepoResult;
use crate::models::campaign::{Campaign, CampaignDetail, CampaignTableRow, CreateCampaign};
use crate::repositories::table::{list_with_permissions, TableSpec};
use crate::repositories::{NamespaceRepo, ShareRepo};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, cid, name, description, type, status, scheduled, source, list, \
    namespace, created_at, updated_at";

const TABLE: TableSpec = TableSpec {
    entity_type: EntityType::Campaign,
    from: "campaigns JOIN namespaces ON namespaces.id = campaigns.namespace",
    select: "campaigns.id, campaigns.name, campaigns.cid, campaigns.description, \
             campaigns.type AS campaign_type, campaigns.status, campaigns.scheduled, \
             campaigns.source, campaigns.created_at, namespaces.name AS namespace_name",
    search_columns: &[
        "campaigns.name",
        "campaigns.cid",
        "campaigns.description",
        "namespaces.name",
    ],
    sortable: &[
        Some("campaigns.id"),
        Some("campaigns.name"),
        Some("campaigns.cid"),
        Some("campaigns.description"),
        Some("campaigns.type"),
        Some("campaigns.status"),
        Some("campaigns.scheduled"),
        Some("campaigns.source"),
        Some("campaigns.created_at"),
        Some("namespaces.name"),
        None,
        None,
    ],
};

/// Provides permission-checked operations for campaigns.
pub struct CampaignRepo;

impl CampaignRepo {
    /// Create an idle campaign. Requires `createCampaign` on the namespace
    /// and `view` on the target list, if any.
    pub async fn create(
        pool: &PgPool,
        ctx: &PermissionContext,
        input: &CreateCampaign,
    ) -> RepoResult<Campaign> {
        let mut tx = pool.begin().await?;

        ShareRepo::enforce_entity_permission(
            &mut tx,
            ctx,
            EntityType::Namespace,
            input.namespace,
            OP_CREATE_CAMPAIGN,
        )
        .await?;

        input.validate()?;
        NamespaceRepo::validate_entity(&mut tx, input.namespace).await?;
        CampaignType::try_from(input.campaign_type)?;
        CampaignSource::try_from(input.source)?;

        if let Some(list_id) = input.list {
            ShareRepo::enforce_entity_permission(&mut tx, ctx, EntityType::List, list_id, OP_VIEW)
                .await?;
        }

        let query = format!(
            "INSERT INTO campaigns
                (cid, name, description, type, status, scheduled, source, list, namespace)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        let campaign = sqlx::query_as::<_, Campaign>(&query)
            .bind(cid::generate())
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.campaign_type)
            .bind(CampaignStatus::Idle as i32)
            .bind(input.scheduled)
            .bind(input.source)
            .bind(input.list)
            .bind(input.namespace)
            .fetch_one(&mut *tx)
            .await?;

        ShareRepo::rebuild_permissions(&mut tx, EntityType::Campaign, campaign.id).await?;

        tx.commit().await?;

        tracing::info!(campaign_id = campaign.id, cid = %campaign.cid, "Created campaign");
        Ok(campaign)
    }

    /// Load a campaign the caller may view.
    ///
    /// A campaign the caller cannot view is reported as not found.
    pub async fn get_by_id(
        pool: &PgPool,
        ctx: &PermissionContext,
        id: DbId,
    ) -> RepoResult<CampaignDetail> {
        let mut conn = pool.acquire().await?;
        let not_found = CoreError::NotFound {
            entity: "Campaign",
            id,
        };

        if !ShareRepo::check_entity_permission(&mut conn, ctx, EntityType::Campaign, id, OP_VIEW)
            .await?
        {
            return Err(not_found.into());
        }

        let query = format!("SELECT {COLUMNS} FROM campaigns WHERE id = $1");
        let campaign = sqlx::query_as::<_, Campaign>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or(not_found)?;

        let status = CampaignStatus::try_from(campaign.status)?;
        let status_label = status_label(status, campaign.scheduled, chrono::Utc::now());
        Ok(CampaignDetail {
            campaign,
            status_label,
        })
    }

    /// Delete a campaign. Requires `delete`.
    pub async fn remove(pool: &PgPool, ctx: &PermissionContext, id: DbId) -> RepoResult<()> {
        let mut tx = pool.begin().await?;

        ShareRepo::enforce_entity_permission(&mut tx, ctx, EntityType::Campaign, id, OP_DELETE)
            .await?;

        let result = sqlx::query("DELETE FROM campaigns WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound {
                entity: "Campaign",
                id,
            }
            .into());
        }

        ShareRepo::remove_entity(&mut tx, EntityType::Campaign, id).await?;
        tx.commit().await?;

        tracing::info!(campaign_id = id, "Deleted campaign");
        Ok(())
    }

    /// One page of the campaigns table, restricted to campaigns the caller
    /// may view. Each row carries its permitted action links.
    pub async fn list_table(
        pool: &PgPool,
        ctx: &PermissionContext,
        params: &TableParams,
    ) -> Result<TableResponse, sqlx::Error> {
        let page = list_with_permissions::<CampaignTableRow>(pool, ctx, &TABLE, params).await?;
        Ok(TableResponse {
            draw: params.draw.unwrap_or(0),
            records_total: page.records_total,
            records_filtered: page.records_filtered,
            data: page
                .rows
                .into_iter()
                .map(CampaignTableRow::into_row)
                .collect(),
        })
    }
}
