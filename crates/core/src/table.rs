//! Paging, sorting, and search parameters for table listings.
//!
//! Table endpoints answer in the shape the admin UI's data table expects:
//! rows are positional arrays, and the envelope carries both the unfiltered
//! and the filtered row count.

use serde::{Deserialize, Serialize};

/// Default page size when the client does not send `length`.
pub const DEFAULT_PAGE_SIZE: i64 = 50;
/// Upper bound on a single page.
pub const MAX_PAGE_SIZE: i64 = 500;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Query parameters accepted by every `*-table` endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TableParams {
    /// Echoed back so the client can discard out-of-order responses.
    pub draw: Option<i64>,
    pub start: Option<i64>,
    pub length: Option<i64>,
    pub search: Option<String>,
    /// Index into the row layout of the endpoint.
    pub order_column: Option<usize>,
    pub order_dir: Option<SortDirection>,
}

impl TableParams {
    pub fn limit(&self) -> i64 {
        clamp_limit(self.length, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> i64 {
        clamp_offset(self.start)
    }

    /// `ILIKE` pattern for the search box, or `None` when it is blank.
    pub fn search_pattern(&self) -> Option<String> {
        let term = self.search.as_deref()?.trim();
        if term.is_empty() {
            return None;
        }
        let escaped = term
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        Some(format!("%{escaped}%"))
    }

    /// Resolve the `ORDER BY` clause against a whitelist of sortable columns.
    ///
    /// `sortable[i]` is the SQL expression for row position `i`, or `None`
    /// when that position cannot be sorted on. Unknown positions fall back to
    /// the first column.
    pub fn order_by(&self, sortable: &[Option<&'static str>]) -> String {
        let column = self
            .order_column
            .and_then(|i| sortable.get(i).copied().flatten())
            .or_else(|| sortable.first().copied().flatten())
            .unwrap_or("1");
        let dir = self.order_dir.unwrap_or_default().as_sql();
        format!("{column} {dir}")
    }
}

/// Response envelope of a table endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableResponse {
    pub draw: i64,
    pub records_total: i64,
    pub records_filtered: i64,
    pub data: Vec<Vec<serde_json::Value>>,
}

/// Clamp a user-provided limit to valid bounds.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).max(1).min(max)
}

/// Clamp a user-provided offset to non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}
