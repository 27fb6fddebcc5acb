//! Repository for the `shares` table and the `permissions` cache.
//!
//! Checks take a `&mut PgConnection` so they can run inside the caller's
//! transaction; pass `&mut *tx` for a transaction or an acquired pool
//! connection otherwise.

use std::collections::{BTreeMap, BTreeSet};

use campaigner_core::error::CoreError;
use campaigner_core::permissions::{
    role_operations, validate_operations, validate_share_role, EntityType, PermissionContext,
    OP_SHARE,
};
use campaigner_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::error::RepoResult;
use crate::models::share::{AssignShare, PermissionCheckRequest, ShareWithUser};

/// Provides permission checks, share management, and cache rebuilds.
pub struct ShareRepo;

impl ShareRepo {
    // ── Checks ───────────────────────────────────────────────────────

    /// Whether the caller holds every operation in `operations` on one
    /// entity. Without `entity_id`, any entity of the type qualifies.
    pub async fn has_operations(
        conn: &mut PgConnection,
        ctx: &PermissionContext,
        entity_type: EntityType,
        entity_id: Option<DbId>,
        operations: &[&str],
    ) -> Result<bool, sqlx::Error> {
        if ctx.is_admin {
            return Ok(true);
        }

        let required: BTreeSet<&str> = operations.iter().copied().collect();
        if required.is_empty() {
            return Ok(true);
        }
        let required: Vec<String> = required.into_iter().map(str::to_string).collect();

        sqlx::query_scalar(
            "SELECT EXISTS ( \
                SELECT 1 FROM permissions \
                WHERE user_id = $1 AND entity_type = $2 AND operation = ANY($3) \
                  AND ($4::BIGINT IS NULL OR entity_id = $4) \
                GROUP BY entity_id \
                HAVING COUNT(DISTINCT operation) = $5)",
        )
        .bind(ctx.user_id)
        .bind(entity_type.as_str())
        .bind(&required)
        .bind(entity_id)
        .bind(required.len() as i64)
        .fetch_one(&mut *conn)
        .await
    }

    /// Whether the caller may perform `operation` on one entity.
    pub async fn check_entity_permission(
        conn: &mut PgConnection,
        ctx: &PermissionContext,
        entity_type: EntityType,
        entity_id: DbId,
        operation: &str,
    ) -> Result<bool, sqlx::Error> {
        Self::has_operations(conn, ctx, entity_type, Some(entity_id), &[operation]).await
    }

    /// Fail with `Forbidden` unless the caller may perform `operation`.
    pub async fn enforce_entity_permission(
        conn: &mut PgConnection,
        ctx: &PermissionContext,
        entity_type: EntityType,
        entity_id: DbId,
        operation: &str,
    ) -> RepoResult<()> {
        if Self::check_entity_permission(conn, ctx, entity_type, entity_id, operation).await? {
            Ok(())
        } else {
            tracing::debug!(
                user_id = ctx.user_id,
                entity_type = %entity_type,
                entity_id,
                operation,
                "Permission denied"
            );
            Err(CoreError::Forbidden(format!(
                "Not permitted to perform '{operation}' on {entity_type} {entity_id}"
            ))
            .into())
        }
    }

    /// Fail with `Forbidden` unless the caller holds all `operations` on at
    /// least one entity of `entity_type`.
    ///
    /// Type-level gate for callers outside this crate. The batch endpoint
    /// answers the same question as a boolean through [`Self::has_operations`].
    pub async fn enforce_type_permission(
        conn: &mut PgConnection,
        ctx: &PermissionContext,
        entity_type: EntityType,
        operations: &[&str],
    ) -> RepoResult<()> {
        if Self::has_operations(conn, ctx, entity_type, None, operations).await? {
            Ok(())
        } else {
            Err(CoreError::Forbidden(format!(
                "Not permitted to perform {operations:?} on any {entity_type}"
            ))
            .into())
        }
    }

    /// Resolve a batch of named permission requests.
    pub async fn check_permissions(
        pool: &PgPool,
        ctx: &PermissionContext,
        requests: &BTreeMap<String, PermissionCheckRequest>,
    ) -> RepoResult<BTreeMap<String, bool>> {
        let mut conn = pool.acquire().await?;
        let mut results = BTreeMap::new();

        for (name, request) in requests {
            validate_operations(request.entity_type_id, &request.required_operations)?;
            let operations: Vec<&str> = request
                .required_operations
                .iter()
                .map(String::as_str)
                .collect();
            let granted = Self::has_operations(
                &mut conn,
                ctx,
                request.entity_type_id,
                request.entity_id,
                &operations,
            )
            .await?;
            results.insert(name.clone(), granted);
        }

        Ok(results)
    }

    // ── Share management ─────────────────────────────────────────────

    /// Grant, change, or revoke a user's share on an entity, then rebuild
    /// the affected permissions.
    pub async fn assign(
        pool: &PgPool,
        ctx: &PermissionContext,
        input: &AssignShare,
    ) -> RepoResult<()> {
        let entity_type = input.entity_type_id;
        let mut tx = pool.begin().await?;

        Self::enforce_entity_permission(&mut tx, ctx, entity_type, input.entity_id, OP_SHARE)
            .await?;

        if !Self::entity_exists(&mut tx, entity_type, input.entity_id).await? {
            return Err(CoreError::NotFound {
                entity: entity_label(entity_type),
                id: input.entity_id,
            }
            .into());
        }

        let user_exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
            .bind(input.user_id)
            .fetch_one(&mut *tx)
            .await?;
        if !user_exists {
            return Err(CoreError::NotFound {
                entity: "User",
                id: input.user_id,
            }
            .into());
        }

        match &input.role {
            Some(role) => {
                validate_share_role(role)?;
                sqlx::query(
                    "INSERT INTO shares (entity_type, entity_id, user_id, role) \
                     VALUES ($1, $2, $3, $4) \
                     ON CONFLICT (entity_type, entity_id, user_id) DO UPDATE SET role = EXCLUDED.role",
                )
                .bind(entity_type.as_str())
                .bind(input.entity_id)
                .bind(input.user_id)
                .bind(role)
                .execute(&mut *tx)
                .await?;
            }
            None => {
                sqlx::query(
                    "DELETE FROM shares WHERE entity_type = $1 AND entity_id = $2 AND user_id = $3",
                )
                .bind(entity_type.as_str())
                .bind(input.entity_id)
                .bind(input.user_id)
                .execute(&mut *tx)
                .await?;
            }
        }

        match entity_type {
            EntityType::Namespace => {
                Self::rebuild_namespace_subtree(&mut tx, input.entity_id).await?
            }
            _ => Self::rebuild_permissions(&mut tx, entity_type, input.entity_id).await?,
        }

        tx.commit().await?;

        tracing::info!(
            entity_type = %entity_type,
            entity_id = input.entity_id,
            user_id = input.user_id,
            role = ?input.role,
            "Share assigned"
        );
        Ok(())
    }

    /// List the shares on an entity. Requires `share` on it.
    pub async fn list_for_entity(
        pool: &PgPool,
        ctx: &PermissionContext,
        entity_type: EntityType,
        entity_id: DbId,
    ) -> RepoResult<Vec<ShareWithUser>> {
        let mut conn = pool.acquire().await?;
        Self::enforce_entity_permission(&mut conn, ctx, entity_type, entity_id, OP_SHARE).await?;

        let shares = sqlx::query_as::<_, ShareWithUser>(
            "SELECT s.user_id, u.username, s.role, s.created_at \
             FROM shares s JOIN users u ON u.id = s.user_id \
             WHERE s.entity_type = $1 AND s.entity_id = $2 \
             ORDER BY u.username",
        )
        .bind(entity_type.as_str())
        .bind(entity_id)
        .fetch_all(&mut *conn)
        .await?;
        Ok(shares)
    }

    /// Delete every share and cached permission of a removed entity.
    pub async fn remove_entity(
        conn: &mut PgConnection,
        entity_type: EntityType,
        entity_id: DbId,
    ) -> Result<(), sqlx::Error> {
        Self::lock_entity(conn, entity_type, entity_id).await?;

        sqlx::query("DELETE FROM shares WHERE entity_type = $1 AND entity_id = $2")
            .bind(entity_type.as_str())
            .bind(entity_id)
            .execute(&mut *conn)
            .await?;
        sqlx::query("DELETE FROM permissions WHERE entity_type = $1 AND entity_id = $2")
            .bind(entity_type.as_str())
            .bind(entity_id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    // ── Cache rebuilds ───────────────────────────────────────────────

    /// Recompute the cached permissions of one entity from its own shares
    /// and the shares on every namespace above it.
    ///
    /// If the entity no longer exists its cache rows are simply cleared.
    /// Concurrent rebuilds of the same entity are serialized until the
    /// enclosing transaction ends.
    pub async fn rebuild_permissions(
        conn: &mut PgConnection,
        entity_type: EntityType,
        entity_id: DbId,
    ) -> Result<(), sqlx::Error> {
        Self::lock_entity(conn, entity_type, entity_id).await?;

        sqlx::query("DELETE FROM permissions WHERE entity_type = $1 AND entity_id = $2")
            .bind(entity_type.as_str())
            .bind(entity_id)
            .execute(&mut *conn)
            .await?;

        let owner_query = format!(
            "SELECT {} FROM {} WHERE id = $1",
            entity_type.owner_column(),
            entity_type.table()
        );
        let owner: Option<Option<DbId>> = sqlx::query_scalar(&owner_query)
            .bind(entity_id)
            .fetch_optional(&mut *conn)
            .await?;
        let Some(owner) = owner else {
            return Ok(());
        };

        let mut grants: Vec<(DbId, String)> = sqlx::query_as(
            "SELECT user_id, role FROM shares WHERE entity_type = $1 AND entity_id = $2",
        )
        .bind(entity_type.as_str())
        .bind(entity_id)
        .fetch_all(&mut *conn)
        .await?;

        if let Some(namespace_id) = owner {
            let inherited: Vec<(DbId, String)> = sqlx::query_as(
                "WITH RECURSIVE chain AS ( \
                    SELECT id, parent FROM namespaces WHERE id = $1 \
                    UNION ALL \
                    SELECT n.id, n.parent FROM namespaces n JOIN chain c ON n.id = c.parent \
                 ) \
                 SELECT s.user_id, s.role FROM shares s \
                 JOIN chain c ON s.entity_id = c.id \
                 WHERE s.entity_type = 'namespace'",
            )
            .bind(namespace_id)
            .fetch_all(&mut *conn)
            .await?;
            grants.extend(inherited);
        }

        let resolved: BTreeSet<(DbId, &'static str)> = grants
            .iter()
            .flat_map(|(user_id, role)| {
                role_operations(entity_type, role)
                    .iter()
                    .map(move |op| (*user_id, *op))
            })
            .collect();

        if resolved.is_empty() {
            return Ok(());
        }

        let (user_ids, operations): (Vec<DbId>, Vec<String>) = resolved
            .into_iter()
            .map(|(user_id, op)| (user_id, op.to_string()))
            .unzip();

        sqlx::query(
            "INSERT INTO permissions (entity_type, entity_id, user_id, operation) \
             SELECT $1, $2, t.user_id, t.operation \
             FROM UNNEST($3::BIGINT[], $4::TEXT[]) AS t(user_id, operation)",
        )
        .bind(entity_type.as_str())
        .bind(entity_id)
        .bind(&user_ids)
        .bind(&operations)
        .execute(&mut *conn)
        .await?;

        tracing::debug!(
            entity_type = %entity_type,
            entity_id,
            grants = user_ids.len(),
            "Rebuilt permissions"
        );
        Ok(())
    }

    /// Rebuild a namespace, every namespace beneath it, and every list and
    /// campaign they own.
    pub async fn rebuild_namespace_subtree(
        conn: &mut PgConnection,
        namespace_id: DbId,
    ) -> Result<(), sqlx::Error> {
        let namespace_ids: Vec<DbId> = sqlx::query_scalar(
            "WITH RECURSIVE subtree AS ( \
                SELECT id FROM namespaces WHERE id = $1 \
                UNION ALL \
                SELECT n.id FROM namespaces n JOIN subtree s ON n.parent = s.id \
             ) \
             SELECT id FROM subtree ORDER BY id",
        )
        .bind(namespace_id)
        .fetch_all(&mut *conn)
        .await?;

        for &id in &namespace_ids {
            Self::rebuild_permissions(conn, EntityType::Namespace, id).await?;
        }

        for entity_type in [EntityType::List, EntityType::Campaign] {
            let query = format!(
                "SELECT id FROM {} WHERE namespace = ANY($1) ORDER BY id",
                entity_type.table()
            );
            let ids: Vec<DbId> = sqlx::query_scalar(&query)
                .bind(&namespace_ids)
                .fetch_all(&mut *conn)
                .await?;
            for id in ids {
                Self::rebuild_permissions(conn, entity_type, id).await?;
            }
        }

        Ok(())
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    /// Take a transaction-scoped advisory lock on one entity's cache rows.
    ///
    /// Subtree rebuilds lock in ascending id order per entity type.
    async fn lock_entity(
        conn: &mut PgConnection,
        entity_type: EntityType,
        entity_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "SELECT pg_advisory_xact_lock(hashtextextended($1::TEXT || ':' || $2::BIGINT::TEXT, 0))",
        )
        .bind(entity_type.as_str())
        .bind(entity_id)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    async fn entity_exists(
        conn: &mut PgConnection,
        entity_type: EntityType,
        entity_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let query = format!(
            "SELECT EXISTS (SELECT 1 FROM {} WHERE id = $1)",
            entity_type.table()
        );
        sqlx::query_scalar(&query)
            .bind(entity_id)
            .fetch_one(&mut *conn)
            .await
    }
}

/// Human-readable entity name used in `NotFound` errors.
pub(crate) fn entity_label(entity_type: EntityType) -> &'static str {
    match entity_type {
        EntityType::Namespace => "Namespace",
        EntityType::List => "List",
        EntityType::Campaign => "Campaign",
    }
}
