//! Standard response envelope helpers.

use axum::{http::StatusCode, Json};
use serde::Serialize;

#[derive(Serialize)]
pub struct DataBody<T> {
    pub success: bool,
    pub data: T,
}

#[derive(Serialize)]
pub struct ListBody<T> {
    pub success: bool,
    pub count: usize,
    pub pagination: Pagination,
    pub data: Vec<T>,
}

#[derive(Serialize)]
pub struct TokenBody {
    pub success: bool,
    pub token: String,
}

#[derive(Debug, Default, PartialEq, Serialize)]
pub struct Pagination {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<PageRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<PageRef>,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct PageRef {
    pub page: u32,
    pub limit: u32,
}

impl Pagination {
    /// Next exists while the page window ends before the filtered total,
    /// prev while the window starts past the first row.
    pub fn compute(page: u32, limit: u32, total: u64) -> Self {
        // A page of zero reads as the first page.
        let page = page.max(1);
        let start = u64::from(page - 1) * u64::from(limit);
        let end = start + u64::from(limit);
        Pagination {
            next: (end < total).then(|| PageRef {
                page: page.saturating_add(1),
                limit,
            }),
            prev: (start > 0).then(|| PageRef {
                page: page - 1,
                limit,
            }),
        }
    }
}

pub fn ok<T: Serialize>(data: T) -> (StatusCode, Json<DataBody<T>>) {
    (
        StatusCode::OK,
        Json(DataBody {
            success: true,
            data,
        }),
    )
}

pub fn created<T: Serialize>(data: T) -> (StatusCode, Json<DataBody<T>>) {
    (
        StatusCode::CREATED,
        Json(DataBody {
            success: true,
            data,
        }),
    )
}

pub fn list<T: Serialize>(data: Vec<T>, pagination: Pagination) -> (StatusCode, Json<ListBody<T>>) {
    let count = data.len();
    (
        StatusCode::OK,
        Json(ListBody {
            success: true,
            count,
            pagination,
            data,
        }),
    )
}
