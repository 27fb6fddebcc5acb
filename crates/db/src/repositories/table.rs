//! Permission-filtered table listings.
//!
//! Every `*-table` endpoint runs the same three queries: the number of rows
//! the caller may see, the number left after the search filter, and one
//! page of those rows with the caller's operations on each row attached as a
//! `permissions` text array.

use campaigner_core::permissions::{EntityType, PermissionContext, OP_VIEW};
use campaigner_core::table::TableParams;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool};

/// Static description of one table listing.
pub(crate) struct TableSpec {
    pub entity_type: EntityType,
    /// `FROM` clause; the entity table must be referenced by its own name.
    pub from: &'static str,
    /// Select list, without the trailing `permissions` column.
    pub select: &'static str,
    /// Columns matched against the search box with `ILIKE`.
    pub search_columns: &'static [&'static str],
    /// Sortable SQL expression per row position.
    pub sortable: &'static [Option<&'static str>],
}

/// One page of rows plus the counts the table widget needs.
pub(crate) struct TablePage<R> {
    pub records_total: i64,
    pub records_filtered: i64,
    pub rows: Vec<R>,
}

/// Run a listing restricted to rows the caller may `view`.
///
/// Bind layout shared by all three queries:
/// `$1` is-admin, `$2` user id, `$3` entity type, `$4` search pattern;
/// the page query adds `$5` all operations, `$6` limit, `$7` offset.
pub(crate) async fn list_with_permissions<R>(
    pool: &PgPool,
    ctx: &PermissionContext,
    def: &TableSpec,
    params: &TableParams,
) -> Result<TablePage<R>, sqlx::Error>
where
    R: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let table = def.entity_type.table();
    let visible = format!(
        "($1 OR EXISTS (SELECT 1 FROM permissions vp \
           WHERE vp.entity_type = $3 AND vp.entity_id = {table}.id \
             AND vp.user_id = $2 AND vp.operation = '{OP_VIEW}'))"
    );
    let search = def
        .search_columns
        .iter()
        .map(|column| format!("{column} ILIKE $4"))
        .collect::<Vec<_>>()
        .join(" OR ");
    let filtered = format!("{visible} AND ($4::TEXT IS NULL OR {search})");
    let pattern = params.search_pattern();

    // $4 is unused here, so this query binds only the first three.
    let total_query = format!("SELECT COUNT(*) FROM {} WHERE {visible}", def.from);
    let records_total: i64 = sqlx::query_scalar(&total_query)
        .bind(ctx.is_admin)
        .bind(ctx.user_id)
        .bind(def.entity_type.as_str())
        .fetch_one(pool)
        .await?;

    let filtered_query = format!("SELECT COUNT(*) FROM {} WHERE {filtered}", def.from);
    let records_filtered: i64 = sqlx::query_scalar(&filtered_query)
        .bind(ctx.is_admin)
        .bind(ctx.user_id)
        .bind(def.entity_type.as_str())
        .bind(&pattern)
        .fetch_one(pool)
        .await?;

    let page_query = format!(
        "SELECT {select}, \
           CASE WHEN $1 THEN $5::TEXT[] ELSE ARRAY( \
             SELECT pp.operation FROM permissions pp \
             WHERE pp.entity_type = $3 AND pp.entity_id = {table}.id AND pp.user_id = $2 \
             ORDER BY pp.operation) END AS permissions \
         FROM {from} \
         WHERE {filtered} \
         ORDER BY {order}, {table}.id \
         LIMIT $6 OFFSET $7",
        select = def.select,
        from = def.from,
        order = params.order_by(def.sortable),
    );
    let all_operations: Vec<String> = def
        .entity_type
        .operations()
        .iter()
        .map(|op| op.to_string())
        .collect();

    let rows = sqlx::query_as::<_, R>(&page_query)
        .bind(ctx.is_admin)
        .bind(ctx.user_id)
        .bind(def.entity_type.as_str())
        .bind(&pattern)
        .bind(&all_operations)
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(pool)
        .await?;

    Ok(TablePage {
        records_total,
        records_filtered,
        rows,
    })
}
