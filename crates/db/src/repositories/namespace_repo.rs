//! Repository for the `namespaces` table and namespace placement rules.

use campaigner_core::error::CoreError;
use campaigner_core::permissions::{
    EntityType, PermissionContext, OP_CREATE_NAMESPACE, OP_VIEW,
};
use campaigner_core::types::DbId;
use sqlx::{PgConnection, PgPool};
use validator::Validate;

use crate::error::RepoResult;
use crate::models::namespace::{CreateNamespace, Namespace, ROOT_NAMESPACE_ID};
use crate::repositories::ShareRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, description, parent, created_at, updated_at";

/// Provides namespace CRUD and the placement checks other entities use.
pub struct NamespaceRepo;

impl NamespaceRepo {
    /// Find a namespace by its internal ID.
    pub async fn find_by_id(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Namespace>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM namespaces WHERE id = $1");
        sqlx::query_as::<_, Namespace>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Check that an entity's target namespace exists.
    pub async fn validate_entity(conn: &mut PgConnection, namespace_id: DbId) -> RepoResult<()> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM namespaces WHERE id = $1)")
                .bind(namespace_id)
                .fetch_one(&mut *conn)
                .await?;
        if exists {
            Ok(())
        } else {
            Err(CoreError::Validation(format!("Namespace {namespace_id} does not exist")).into())
        }
    }

    /// Check the caller may move an entity from `old_namespace` to
    /// `new_namespace`.
    ///
    /// Moving needs `create_op` on the destination and `delete_op` on the
    /// entity itself. Staying put needs nothing.
    #[allow(clippy::too_many_arguments)]
    pub async fn validate_move(
        conn: &mut PgConnection,
        ctx: &PermissionContext,
        entity_type: EntityType,
        entity_id: DbId,
        old_namespace: DbId,
        new_namespace: DbId,
        create_op: &str,
        delete_op: &str,
    ) -> RepoResult<()> {
        if old_namespace == new_namespace {
            return Ok(());
        }

        ShareRepo::enforce_entity_permission(
            conn,
            ctx,
            EntityType::Namespace,
            new_namespace,
            create_op,
        )
        .await?;
        ShareRepo::enforce_entity_permission(conn, ctx, entity_type, entity_id, delete_op).await?;

        tracing::debug!(
            entity_type = %entity_type,
            entity_id,
            old_namespace,
            new_namespace,
            "Namespace move permitted"
        );
        Ok(())
    }

    /// Create a namespace under `parent` (root if omitted).
    pub async fn create(
        pool: &PgPool,
        ctx: &PermissionContext,
        input: &CreateNamespace,
    ) -> RepoResult<Namespace> {
        let parent = input.parent.unwrap_or(ROOT_NAMESPACE_ID);
        let mut tx = pool.begin().await?;

        ShareRepo::enforce_entity_permission(
            &mut tx,
            ctx,
            EntityType::Namespace,
            parent,
            OP_CREATE_NAMESPACE,
        )
        .await?;
        input.validate()?;
        Self::validate_entity(&mut tx, parent).await?;

        let query = format!(
            "INSERT INTO namespaces (name, description, parent)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        let namespace = sqlx::query_as::<_, Namespace>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(parent)
            .fetch_one(&mut *tx)
            .await?;

        ShareRepo::rebuild_permissions(&mut tx, EntityType::Namespace, namespace.id).await?;
        tx.commit().await?;

        tracing::info!(namespace_id = namespace.id, parent, "Created namespace");
        Ok(namespace)
    }

    /// Load a namespace the caller may view.
    ///
    /// A namespace the caller cannot view is reported as not found.
    pub async fn get_by_id(
        pool: &PgPool,
        ctx: &PermissionContext,
        id: DbId,
    ) -> RepoResult<Namespace> {
        let mut conn = pool.acquire().await?;
        let not_found = CoreError::NotFound {
            entity: "Namespace",
            id,
        };

        if !ShareRepo::check_entity_permission(&mut conn, ctx, EntityType::Namespace, id, OP_VIEW)
            .await?
        {
            return Err(not_found.into());
        }

        Self::find_by_id(&mut conn, id)
            .await?
            .ok_or_else(|| not_found.into())
    }

    /// List the namespaces the caller may view, ordered by name.
    pub async fn list(pool: &PgPool, ctx: &PermissionContext) -> Result<Vec<Namespace>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM namespaces
             WHERE $1 OR EXISTS (
                SELECT 1 FROM permissions p
                WHERE p.entity_type = 'namespace' AND p.entity_id = namespaces.id
                  AND p.user_id = $2 AND p.operation = 'view')
             ORDER BY name, id"
        );
        sqlx::query_as::<_, Namespace>(&query)
            .bind(ctx.is_admin)
            .bind(ctx.user_id)
            .fetch_all(pool)
            .await
    }
}
