//! Shared list execution: runs the page and count queries and converts rows
//! to JSON documents under their client-facing names.

use chrono::{DateTime, Utc};
use serde_json::{Map, Number, Value};
use sqlx::{postgres::PgRow, PgPool, Row};
use uuid::Uuid;

use crate::error::ApiError;
use crate::query::{builder, ColumnDef, ColumnKind, ListQuery, TableSpec};

pub struct ListPage {
    pub items: Vec<Value>,
    pub total: u64,
}

/// One page of documents plus the filtered total for pagination links.
pub async fn fetch_page(
    pool: &PgPool,
    spec: &TableSpec,
    query: &ListQuery,
) -> Result<ListPage, ApiError> {
    let page = builder::select_page(spec, query)?;
    tracing::debug!(sql = %page.sql, params = ?page.params, "list query");
    let mut q = sqlx::query(&page.sql);
    for p in &page.params {
        q = q.bind(p.as_str());
    }
    let rows = q.fetch_all(pool).await?;
    let cols = builder::selected(spec, query);
    let items = rows.iter().map(|row| row_to_document(row, &cols)).collect();

    let count = builder::count(spec, query)?;
    tracing::debug!(sql = %count.sql, params = ?count.params, "count query");
    let mut q = sqlx::query_scalar::<_, i64>(&count.sql);
    for p in &count.params {
        q = q.bind(p.as_str());
    }
    let total = q.fetch_one(pool).await?.max(0) as u64;

    Ok(ListPage { items, total })
}

fn row_to_document(row: &PgRow, cols: &[&ColumnDef]) -> Value {
    let mut map = Map::new();
    for col in cols {
        map.insert(col.api.to_string(), cell_value(row, col));
    }
    Value::Object(map)
}

/// Decode one projected cell by its column kind. Result columns are aliased
/// to the client-facing name, so lookups use `api`.
fn cell_value(row: &PgRow, col: &ColumnDef) -> Value {
    match col.kind {
        ColumnKind::Uuid => row
            .try_get::<Uuid, _>(col.api)
            .map(|u| Value::String(u.to_string()))
            .unwrap_or(Value::Null),
        ColumnKind::Text => row
            .try_get::<Option<String>, _>(col.api)
            .ok()
            .flatten()
            .map(Value::String)
            .unwrap_or(Value::Null),
        ColumnKind::Float => row
            .try_get::<Option<f64>, _>(col.api)
            .ok()
            .flatten()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ColumnKind::Timestamp => row
            .try_get::<DateTime<Utc>, _>(col.api)
            .map(|t| Value::String(t.to_rfc3339()))
            .unwrap_or(Value::Null),
        ColumnKind::UuidArray => row
            .try_get::<Vec<Uuid>, _>(col.api)
            .map(|ids| {
                Value::Array(
                    ids.into_iter()
                        .map(|u| Value::String(u.to_string()))
                        .collect(),
                )
            })
            .unwrap_or(Value::Null),
    }
}
