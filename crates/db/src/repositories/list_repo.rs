//! Repository for the `lists` table and the per-list subscription tables.
//!
//! Every mutation runs in one transaction together with its side effects:
//! the `subscription__<id>` table and the permission cache. If any step
//! fails the transaction is dropped uncommitted and nothing persists.

use campaigner_core::cid;
use campaigner_core::error::CoreError;
use campaigner_core::lists::{
    subscription_table_name, validate_unsubscription_mode, SUBSCRIPTION_TEMPLATE_TABLE,
};
use campaigner_core::permissions::{
    EntityType, PermissionContext, OP_CREATE_LIST, OP_DELETE, OP_EDIT, OP_VIEW,
};
use campaigner_core::table::{TableParams, TableResponse};
use campaigner_core::types::DbId;
use sqlx::{PgConnection, PgPool};
use validator::Validate;

use crate::error::RepoResult;
use crate::models::list::{CreateList, List, ListTableRow, ListWithHash, UpdateList};
use crate::repositories::table::{list_with_permissions, TableSpec};
use crate::repositories::{NamespaceRepo, ShareRepo};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, cid, name, description, default_form, public_subscribe, \
    unsubscription_mode, subscribers, namespace, created_at, updated_at";

const TABLE: TableSpec = TableSpec {
    entity_type: EntityType::List,
    from: "lists JOIN namespaces ON namespaces.id = lists.namespace",
    select: "lists.id, lists.name, lists.cid, lists.subscribers, lists.description, \
             namespaces.name AS namespace_name",
    search_columns: &[
        "lists.name",
        "lists.cid",
        "lists.description",
        "namespaces.name",
    ],
    sortable: &[
        Some("lists.id"),
        Some("lists.name"),
        Some("lists.cid"),
        Some("lists.subscribers"),
        Some("lists.description"),
        Some("namespaces.name"),
        None,
    ],
};

/// Provides permission-checked CRUD for mailing lists.
pub struct ListRepo;

impl ListRepo {
    // ── Permission-checked operations ────────────────────────────────

    /// Create a list in `input.namespace` together with its subscription
    /// table. Requires `createList` on the namespace.
    pub async fn create(
        pool: &PgPool,
        ctx: &PermissionContext,
        input: &CreateList,
    ) -> RepoResult<List> {
        let mut tx = pool.begin().await?;

        ShareRepo::enforce_entity_permission(
            &mut tx,
            ctx,
            EntityType::Namespace,
            input.namespace,
            OP_CREATE_LIST,
        )
        .await?;

        input.validate()?;
        NamespaceRepo::validate_entity(&mut tx, input.namespace).await?;
        validate_unsubscription_mode(input.unsubscription_mode)?;

        let query = format!(
            "INSERT INTO lists
                (cid, name, description, default_form, public_subscribe, unsubscription_mode, namespace)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        let list = sqlx::query_as::<_, List>(&query)
            .bind(cid::generate())
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.default_form)
            .bind(input.public_subscribe)
            .bind(input.unsubscription_mode)
            .bind(input.namespace)
            .fetch_one(&mut *tx)
            .await?;

        Self::create_subscription_table(&mut tx, list.id).await?;
        ShareRepo::rebuild_permissions(&mut tx, EntityType::List, list.id).await?;

        tx.commit().await?;

        tracing::info!(list_id = list.id, cid = %list.cid, namespace = list.namespace, "Created list");
        Ok(list)
    }

    /// Update a list if nobody changed it since the caller read it.
    ///
    /// `input.original_hash` must equal the hash of the row as currently
    /// stored, otherwise the update fails with `Changed` and the row is left
    /// untouched. Requires `edit` on the list, plus `createList` on the new
    /// namespace and `delete` on the list when it moves.
    pub async fn update_with_consistency_check(
        pool: &PgPool,
        ctx: &PermissionContext,
        id: DbId,
        input: &UpdateList,
    ) -> RepoResult<List> {
        let mut tx = pool.begin().await?;

        ShareRepo::enforce_entity_permission(&mut tx, ctx, EntityType::List, id, OP_EDIT).await?;

        let query = format!("SELECT {COLUMNS} FROM lists WHERE id = $1 FOR UPDATE");
        let existing = sqlx::query_as::<_, List>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(CoreError::NotFound { entity: "List", id })?;

        if existing.hash()? != input.original_hash {
            tracing::info!(list_id = id, "Rejected stale list update");
            return Err(CoreError::Changed { entity: "List", id }.into());
        }

        input.validate()?;
        NamespaceRepo::validate_entity(&mut tx, input.namespace).await?;
        NamespaceRepo::validate_move(
            &mut tx,
            ctx,
            EntityType::List,
            id,
            existing.namespace,
            input.namespace,
            OP_CREATE_LIST,
            OP_DELETE,
        )
        .await?;
        validate_unsubscription_mode(input.unsubscription_mode)?;

        let query = format!(
            "UPDATE lists SET
                name = $2,
                description = $3,
                default_form = $4,
                public_subscribe = $5,
                unsubscription_mode = $6,
                namespace = $7
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let list = sqlx::query_as::<_, List>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.default_form)
            .bind(input.public_subscribe)
            .bind(input.unsubscription_mode)
            .bind(input.namespace)
            .fetch_one(&mut *tx)
            .await?;

        ShareRepo::rebuild_permissions(&mut tx, EntityType::List, id).await?;

        tx.commit().await?;

        tracing::info!(list_id = id, "Updated list");
        Ok(list)
    }

    /// Delete a list and drop its subscription table. Requires `delete`.
    pub async fn remove(pool: &PgPool, ctx: &PermissionContext, id: DbId) -> RepoResult<()> {
        let mut tx = pool.begin().await?;

        ShareRepo::enforce_entity_permission(&mut tx, ctx, EntityType::List, id, OP_DELETE)
            .await?;

        let result = sqlx::query("DELETE FROM lists WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound { entity: "List", id }.into());
        }

        Self::drop_subscription_table(&mut tx, id).await?;
        ShareRepo::remove_entity(&mut tx, EntityType::List, id).await?;

        tx.commit().await?;

        tracing::info!(list_id = id, "Deleted list");
        Ok(())
    }

    /// Load a list the caller may view, with its current hash.
    ///
    /// A list the caller cannot view is reported as not found.
    pub async fn get_by_id(
        pool: &PgPool,
        ctx: &PermissionContext,
        id: DbId,
    ) -> RepoResult<ListWithHash> {
        let mut conn = pool.acquire().await?;
        let not_found = CoreError::NotFound { entity: "List", id };

        if !ShareRepo::check_entity_permission(&mut conn, ctx, EntityType::List, id, OP_VIEW)
            .await?
        {
            return Err(not_found.into());
        }

        let query = format!("SELECT {COLUMNS} FROM lists WHERE id = $1");
        let list = sqlx::query_as::<_, List>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or(not_found)?;

        let hash = list.hash()?;
        Ok(ListWithHash { list, hash })
    }

    /// One page of the lists table, restricted to lists the caller may view.
    pub async fn list_table(
        pool: &PgPool,
        ctx: &PermissionContext,
        params: &TableParams,
    ) -> Result<TableResponse, sqlx::Error> {
        let page = list_with_permissions::<ListTableRow>(pool, ctx, &TABLE, params).await?;
        Ok(TableResponse {
            draw: params.draw.unwrap_or(0),
            records_total: page.records_total,
            records_filtered: page.records_filtered,
            data: page.rows.into_iter().map(ListTableRow::into_row).collect(),
        })
    }

    // ── Unchecked lookups ────────────────────────────────────────────

    /// Find a list by its internal ID without any permission check.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<List>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM lists WHERE id = $1");
        sqlx::query_as::<_, List>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether the subscription table of list `id` exists.
    pub async fn subscription_table_exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS (
                SELECT 1 FROM information_schema.tables
                WHERE table_schema = current_schema() AND table_name = $1)",
        )
        .bind(subscription_table_name(id))
        .fetch_one(pool)
        .await
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    async fn create_subscription_table(
        conn: &mut PgConnection,
        list_id: DbId,
    ) -> Result<(), sqlx::Error> {
        let ddl = format!(
            "CREATE TABLE {} (LIKE {SUBSCRIPTION_TEMPLATE_TABLE} INCLUDING ALL)",
            subscription_table_name(list_id)
        );
        sqlx::query(&ddl).execute(&mut *conn).await?;
        Ok(())
    }

    async fn drop_subscription_table(
        conn: &mut PgConnection,
        list_id: DbId,
    ) -> Result<(), sqlx::Error> {
        let ddl = format!(
            "DROP TABLE IF EXISTS {}",
            subscription_table_name(list_id)
        );
        sqlx::query(&ddl).execute(&mut *conn).await?;
        Ok(())
    }
}
