//! Menu catalog handlers. Reads are public; writes are staff-only.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use serde_json::{json, Value};
use std::collections::HashMap;

use super::{not_found, parse_id, parse_json};
use crate::auth::guard::Staff;
use crate::error::ApiError;
use crate::models::menu::{CreateMenuItemRequest, UpdateMenuItemRequest, MENU_TABLE};
use crate::query::ListQuery;
use crate::response::{self, Pagination};
use crate::service::{list, menu};
use crate::state::AppState;

pub async fn list_items(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let query = ListQuery::from_params(&params);
    let page = list::fetch_page(&state.pool, &MENU_TABLE, &query).await?;
    let pagination = Pagination::compute(query.page, query.limit, page.total);
    Ok(response::list(page.items, pagination))
}

pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    let item = menu::get(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(response::ok(item))
}

pub async fn create_item(
    State(state): State<AppState>,
    Staff(_user): Staff,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let req: CreateMenuItemRequest = parse_json(body)?;
    req.validate()?;
    let item = menu::create(&state.pool, &req).await?;
    Ok(response::created(item))
}

pub async fn update_item(
    State(state): State<AppState>,
    Staff(_user): Staff,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    let req: UpdateMenuItemRequest = parse_json(body)?;
    req.validate()?;
    let item = menu::update(&state.pool, id, &req)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(response::ok(item))
}

pub async fn delete_item(
    State(state): State<AppState>,
    Staff(_user): Staff,
    Path(id): Path<String>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    menu::delete(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(response::ok(json!({})))
}
