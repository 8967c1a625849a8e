//! Builds parameterized SELECT and COUNT statements from a list query.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use uuid::Uuid;

use super::{ColumnDef, ColumnKind, Filter, FilterOp, ListQuery, TableSpec};
use crate::error::ApiError;

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<String>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: &str) -> u32 {
        let n = self.params.len() as u32 + 1;
        self.params.push(v.to_string());
        n
    }

    /// Placeholder with the column's SQL cast so text binds coerce correctly.
    fn placeholder(&mut self, value: &str, kind: ColumnKind) -> String {
        let n = self.push_param(value);
        format!("${}{}", n, kind.cast())
    }
}

/// Quote identifier for PostgreSQL (safe: only from static specs).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Columns a query returns, in projection order. The key column always rides
/// along; unknown names in the select list are dropped.
pub fn selected<'a>(spec: &'a TableSpec, query: &ListQuery) -> Vec<&'a ColumnDef> {
    let Some(fields) = &query.select else {
        return spec.columns.iter().collect();
    };
    let mut cols: Vec<&ColumnDef> = Vec::new();
    if let Some(pk) = spec.column(spec.pk) {
        cols.push(pk);
    }
    for field in fields {
        if let Some(col) = spec.column(field) {
            if !cols.iter().any(|c| c.api == col.api) {
                cols.push(col);
            }
        }
    }
    cols
}

/// SELECT list: each column quoted, aliased when the client-facing name differs.
fn select_column_list(cols: &[&ColumnDef]) -> String {
    cols.iter()
        .map(|c| {
            if c.api == c.column {
                quoted(c.column)
            } else {
                format!("{} AS {}", quoted(c.column), quoted(c.api))
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn where_clause(
    spec: &TableSpec,
    query: &ListQuery,
    q: &mut QueryBuf,
) -> Result<String, ApiError> {
    let mut parts = Vec::new();
    for filter in &query.filters {
        let Some(col) = spec.column(&filter.field) else {
            continue;
        };
        if let Some(part) = predicate(col, filter, q)? {
            parts.push(part);
        }
    }
    Ok(if parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", parts.join(" AND "))
    })
}

fn predicate(
    col: &ColumnDef,
    filter: &Filter,
    q: &mut QueryBuf,
) -> Result<Option<String>, ApiError> {
    match (filter.op, col.kind) {
        // membership on array columns: row matches when any listed id is present
        (FilterOp::In, ColumnKind::UuidArray) => {
            let Some(phs) = in_placeholders(&filter.value, col, q)? else {
                return Ok(None);
            };
            Ok(Some(format!("{} && ARRAY[{}]", quoted(col.column), phs)))
        }
        (FilterOp::In, _) => {
            let Some(phs) = in_placeholders(&filter.value, col, q)? else {
                return Ok(None);
            };
            Ok(Some(format!("{} IN ({})", quoted(col.column), phs)))
        }
        (FilterOp::Eq, ColumnKind::UuidArray) => {
            check_value(col, &filter.value)?;
            let ph = q.placeholder(&filter.value, col.kind);
            Ok(Some(format!("{} = ANY({})", ph, quoted(col.column))))
        }
        // ordering comparisons make no sense on arrays
        (_, ColumnKind::UuidArray) => Ok(None),
        (op, kind) => {
            check_value(col, &filter.value)?;
            let ph = q.placeholder(&filter.value, kind);
            Ok(Some(format!("{} {} {}", quoted(col.column), op.sql(), ph)))
        }
    }
}

fn in_placeholders(
    raw: &str,
    col: &ColumnDef,
    q: &mut QueryBuf,
) -> Result<Option<String>, ApiError> {
    let values: Vec<&str> = raw
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .collect();
    if values.is_empty() {
        return Ok(None);
    }
    let mut phs = Vec::new();
    for v in values {
        check_value(col, v)?;
        phs.push(q.placeholder(v, col.kind));
    }
    Ok(Some(phs.join(", ")))
}

/// Filter values bind as text and coerce through a SQL cast. A value the
/// cast cannot take is a client error and never reaches the database.
fn check_value(col: &ColumnDef, raw: &str) -> Result<(), ApiError> {
    let ok = match col.kind {
        ColumnKind::Text => true,
        ColumnKind::Uuid | ColumnKind::UuidArray => Uuid::parse_str(raw).is_ok(),
        ColumnKind::Float => raw.parse::<f64>().map_or(false, f64::is_finite),
        ColumnKind::Timestamp => timestamp_accepted(raw),
    };
    if ok {
        Ok(())
    } else {
        Err(ApiError::Validation(format!(
            "invalid filter value for {}: {}",
            col.api, raw
        )))
    }
}

/// RFC 3339, a naive date-time, or a bare date.
fn timestamp_accepted(raw: &str) -> bool {
    DateTime::parse_from_rfc3339(raw).is_ok()
        || NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S").is_ok()
        || NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").is_ok()
        || NaiveDate::parse_from_str(raw, "%Y-%m-%d").is_ok()
}

/// ORDER BY from whitelisted sort keys, falling back to the key column.
fn order_clause(spec: &TableSpec, query: &ListQuery) -> String {
    let mut keys = Vec::new();
    for sort in &query.sort {
        if let Some(col) = spec.column(&sort.field) {
            let dir = if sort.descending { " DESC" } else { "" };
            keys.push(format!("{}{}", quoted(col.column), dir));
        }
    }
    if keys.is_empty() {
        if let Some(pk) = spec.column(spec.pk) {
            keys.push(quoted(pk.column));
        }
    }
    format!(" ORDER BY {}", keys.join(", "))
}

/// One page of rows: filters, projection, sort, and the page window.
pub fn select_page(spec: &TableSpec, query: &ListQuery) -> Result<QueryBuf, ApiError> {
    let mut q = QueryBuf::new();
    let where_clause = where_clause(spec, query, &mut q)?;
    let cols = select_column_list(&selected(spec, query));
    let order_clause = order_clause(spec, query);
    q.sql = format!(
        "SELECT {} FROM {}{}{} LIMIT {} OFFSET {}",
        cols,
        quoted(spec.table),
        where_clause,
        order_clause,
        query.limit,
        query.skip()
    );
    Ok(q)
}

/// Total rows under the same filters, for pagination links.
pub fn count(spec: &TableSpec, query: &ListQuery) -> Result<QueryBuf, ApiError> {
    let mut q = QueryBuf::new();
    let where_clause = where_clause(spec, query, &mut q)?;
    q.sql = format!("SELECT COUNT(*) FROM {}{}", quoted(spec.table), where_clause);
    Ok(q)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    static TABLE: TableSpec = TableSpec {
        table: "menu_items",
        pk: "id",
        columns: &[
            ColumnDef {
                api: "id",
                column: "id",
                kind: ColumnKind::Uuid,
            },
            ColumnDef {
                api: "name",
                column: "name",
                kind: ColumnKind::Text,
            },
            ColumnDef {
                api: "type",
                column: "type",
                kind: ColumnKind::Text,
            },
            ColumnDef {
                api: "cost",
                column: "cost",
                kind: ColumnKind::Float,
            },
            ColumnDef {
                api: "createdAt",
                column: "created_at",
                kind: ColumnKind::Timestamp,
            },
            ColumnDef {
                api: "items",
                column: "item_ids",
                kind: ColumnKind::UuidArray,
            },
        ],
    };

    fn from_params(pairs: &[(&str, &str)]) -> ListQuery {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ListQuery::from_params(&map)
    }

    #[test]
    fn bare_query_selects_everything_with_defaults() {
        let q = select_page(&TABLE, &from_params(&[])).unwrap();
        assert_eq!(
            q.sql,
            "SELECT \"id\", \"name\", \"type\", \"cost\", \"created_at\" AS \"createdAt\", \
             \"item_ids\" AS \"items\" FROM \"menu_items\" ORDER BY \"type\" LIMIT 100 OFFSET 0"
        );
        assert!(q.params.is_empty());
    }

    #[test]
    fn comparison_filter_binds_with_cast() {
        let q = select_page(&TABLE, &from_params(&[("cost[gte]", "4")])).unwrap();
        assert!(q.sql.contains("WHERE \"cost\" >= $1::float8"));
        assert_eq!(q.params, vec!["4".to_string()]);
    }

    #[test]
    fn in_filter_expands_per_value() {
        let q = select_page(&TABLE, &from_params(&[("type[in]", "lunch, dinner")])).unwrap();
        assert!(q.sql.contains("WHERE \"type\" IN ($1, $2)"));
        assert_eq!(q.params, vec!["lunch".to_string(), "dinner".to_string()]);
    }

    #[test]
    fn array_membership_uses_overlap() {
        let a = "0c9130e9-7760-41c8-a7fa-5915f7016d29";
        let b = "c2f4b8c5-9f90-4b8e-b3c0-3b1a0bdb7b10";
        let q = select_page(&TABLE, &from_params(&[("items[in]", &format!("{a},{b}"))])).unwrap();
        assert!(q.sql.contains("\"item_ids\" && ARRAY[$1::uuid, $2::uuid]"));
        assert_eq!(q.params, vec![a.to_string(), b.to_string()]);

        let q = select_page(&TABLE, &from_params(&[("items", a)])).unwrap();
        assert!(q.sql.contains("$1::uuid = ANY(\"item_ids\")"));
    }

    #[test]
    fn range_comparison_on_array_column_is_dropped() {
        let q = select_page(&TABLE, &from_params(&[("items[gt]", "x")])).unwrap();
        assert!(!q.sql.contains("WHERE"));
        assert!(q.params.is_empty());
    }

    #[test]
    fn unknown_field_filters_are_dropped() {
        let q = select_page(&TABLE, &from_params(&[("bogus", "1"), ("cost[max]", "5")])).unwrap();
        assert!(!q.sql.contains("WHERE"));
        assert!(q.params.is_empty());
    }

    #[test]
    fn projection_always_carries_the_key_column() {
        let q = select_page(&TABLE, &from_params(&[("select", "name,cost")])).unwrap();
        assert!(q.sql.starts_with("SELECT \"id\", \"name\", \"cost\" FROM"));
    }

    #[test]
    fn projection_aliases_renamed_columns() {
        let q = select_page(&TABLE, &from_params(&[("select", "createdAt")])).unwrap();
        assert!(q
            .sql
            .starts_with("SELECT \"id\", \"created_at\" AS \"createdAt\" FROM"));
    }

    #[test]
    fn duplicate_and_unknown_selects_collapse() {
        let q = select_page(&TABLE, &from_params(&[("select", "id,name,name,ghost")])).unwrap();
        assert!(q.sql.starts_with("SELECT \"id\", \"name\" FROM"));
    }

    #[test]
    fn sort_keys_are_whitelisted_with_pk_fallback() {
        let q = select_page(&TABLE, &from_params(&[("sort", "-cost,ghost")])).unwrap();
        assert!(q.sql.contains("ORDER BY \"cost\" DESC LIMIT"));

        let q = select_page(&TABLE, &from_params(&[("sort", "ghost")])).unwrap();
        assert!(q.sql.contains("ORDER BY \"id\" LIMIT"));
    }

    #[test]
    fn page_window_becomes_limit_offset() {
        let q = select_page(&TABLE, &from_params(&[("page", "3"), ("limit", "25")])).unwrap();
        assert!(q.sql.ends_with("LIMIT 25 OFFSET 50"));
    }

    #[test]
    fn count_shares_the_filter_predicates() {
        let params = [("cost[gte]", "4"), ("type", "lunch")];
        let page = select_page(&TABLE, &from_params(&params)).unwrap();
        let total = count(&TABLE, &from_params(&params)).unwrap();
        assert_eq!(
            total.sql,
            "SELECT COUNT(*) FROM \"menu_items\" WHERE \"cost\" >= $1::float8 AND \"type\" = $2"
        );
        assert_eq!(total.params, page.params);
    }

    #[test]
    fn filters_combine_with_and_in_field_order() {
        let q = select_page(
            &TABLE,
            &from_params(&[("type", "lunch"), ("cost[lt]", "10")]),
        )
        .unwrap();
        assert!(q
            .sql
            .contains("WHERE \"cost\" < $1::float8 AND \"type\" = $2"));
        assert_eq!(q.params, vec!["10".to_string(), "lunch".to_string()]);
    }

    #[test]
    fn uncastable_numeric_filter_is_rejected_before_sql() {
        let err = select_page(&TABLE, &from_params(&[("cost[gte]", "abc")])).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert!(err.to_string().contains("cost"));
    }

    #[test]
    fn malformed_uuid_filters_are_rejected() {
        let err = select_page(&TABLE, &from_params(&[("id", "xyz")])).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        let err = select_page(&TABLE, &from_params(&[("items", "xyz")])).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn one_bad_element_fails_the_whole_list_filter() {
        let err = select_page(&TABLE, &from_params(&[("cost[in]", "4, abc")])).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn date_filters_take_common_timestamp_forms() {
        for value in ["2024-01-01", "2024-01-01 10:30:00", "2024-01-01T10:30:00Z"] {
            let q = select_page(&TABLE, &from_params(&[("createdAt[gte]", value)])).unwrap();
            assert!(q.sql.contains("\"created_at\" >= $1::timestamptz"));
        }
        let err = select_page(&TABLE, &from_params(&[("createdAt[gte]", "yesterday")])).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn count_rejects_the_same_garbage_values() {
        let err = count(&TABLE, &from_params(&[("cost[lt]", "ten")])).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn infinite_and_nan_floats_are_rejected() {
        for value in ["NaN", "inf", "1e999"] {
            let err = select_page(&TABLE, &from_params(&[("cost[lte]", value)])).unwrap_err();
            assert!(matches!(err, ApiError::Validation(_)));
        }
    }
}
