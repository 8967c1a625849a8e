//! List-query parsing: filters, projection, sort, and pagination from URL parameters.

pub mod builder;

use std::collections::HashMap;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 100;
pub const DEFAULT_SORT_FIELD: &str = "type";

/// Parameter names consumed by the engine itself, never treated as filters.
const RESERVED_KEYS: &[&str] = &["select", "sort", "page", "limit"];

/// How a column binds and decodes. Every bound value arrives as text and is
/// cast in SQL, so the kind picks the cast and the JSON shape on the way out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnKind {
    Uuid,
    Text,
    Float,
    Timestamp,
    UuidArray,
}

impl ColumnKind {
    /// Cast suffix for a bound scalar of this kind (element cast for arrays).
    pub fn cast(self) -> &'static str {
        match self {
            ColumnKind::Uuid | ColumnKind::UuidArray => "::uuid",
            ColumnKind::Text => "",
            ColumnKind::Float => "::float8",
            ColumnKind::Timestamp => "::timestamptz",
        }
    }
}

/// One queryable column: the name clients use, the table column behind it.
pub struct ColumnDef {
    pub api: &'static str,
    pub column: &'static str,
    pub kind: ColumnKind,
}

/// A listable table and its queryable columns. Filters, sorts, and selects
/// naming anything else are dropped rather than rejected.
pub struct TableSpec {
    pub table: &'static str,
    pub pk: &'static str,
    pub columns: &'static [ColumnDef],
}

impl TableSpec {
    pub fn column(&self, api_name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.api == api_name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
}

impl FilterOp {
    fn parse(op: &str) -> Option<FilterOp> {
        match op {
            "gt" => Some(FilterOp::Gt),
            "gte" => Some(FilterOp::Gte),
            "lt" => Some(FilterOp::Lt),
            "lte" => Some(FilterOp::Lte),
            "in" => Some(FilterOp::In),
            _ => None,
        }
    }

    /// SQL comparison operator. `In` expands to a placeholder list instead.
    pub fn sql(self) -> &'static str {
        match self {
            FilterOp::Eq => "=",
            FilterOp::Gt => ">",
            FilterOp::Gte => ">=",
            FilterOp::Lt => "<",
            FilterOp::Lte => "<=",
            FilterOp::In => "IN",
        }
    }
}

#[derive(Debug, PartialEq)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: String,
}

#[derive(Debug, PartialEq)]
pub struct SortKey {
    pub field: String,
    pub descending: bool,
}

/// Everything a list endpoint needs, decoded from its query string.
#[derive(Debug)]
pub struct ListQuery {
    pub filters: Vec<Filter>,
    pub select: Option<Vec<String>>,
    pub sort: Vec<SortKey>,
    pub page: u32,
    pub limit: u32,
}

impl ListQuery {
    pub fn from_params(params: &HashMap<String, String>) -> ListQuery {
        let mut filters: Vec<Filter> = params
            .iter()
            .filter(|(key, _)| !RESERVED_KEYS.contains(&key.as_str()))
            .map(|(key, value)| parse_filter(key, value))
            .collect();
        // HashMap order is arbitrary; keep the emitted SQL deterministic.
        filters.sort_by(|a, b| a.field.cmp(&b.field));

        let select = params.get("select").map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .map(str::to_string)
                .collect()
        });

        let sort = match params.get("sort") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .map(parse_sort_key)
                .collect(),
            None => vec![SortKey {
                field: DEFAULT_SORT_FIELD.to_string(),
                descending: false,
            }],
        };

        ListQuery {
            filters,
            select,
            sort,
            page: parse_positive(params.get("page"), DEFAULT_PAGE),
            limit: parse_positive(params.get("limit"), DEFAULT_LIMIT),
        }
    }

    /// Rows skipped before the requested page starts.
    pub fn skip(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }
}

/// `cost[gte]` style keys carry an operator suffix; anything else is equality.
/// An unknown suffix leaves the whole key as a (never-matching) field name.
fn parse_filter(key: &str, value: &str) -> Filter {
    if let Some((field, rest)) = key.split_once('[') {
        if let Some(op) = rest.strip_suffix(']').and_then(FilterOp::parse) {
            return Filter {
                field: field.to_string(),
                op,
                value: value.to_string(),
            };
        }
    }
    Filter {
        field: key.to_string(),
        op: FilterOp::Eq,
        value: value.to_string(),
    }
}

fn parse_sort_key(raw: &str) -> SortKey {
    if let Some(field) = raw.strip_prefix('-') {
        SortKey {
            field: field.to_string(),
            descending: true,
        }
    } else {
        SortKey {
            field: raw.strip_prefix('+').unwrap_or(raw).to_string(),
            descending: false,
        }
    }
}

/// Zero and unparsable values fall back to the default.
fn parse_positive(raw: Option<&String>, default: u32) -> u32 {
    raw.and_then(|v| v.parse::<u32>().ok())
        .filter(|n| *n >= 1)
        .unwrap_or(default)
}
