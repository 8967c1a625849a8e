//! Order handlers. Creation is open to any account; the collection list and
//! order mutation are staff-only; a single order is visible to its owner or
//! an admin.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use serde_json::{json, Value};
use std::collections::HashMap;

use super::{not_found, parse_id, parse_json};
use crate::auth::guard::{AuthUser, Staff};
use crate::error::ApiError;
use crate::models::order::{CreateOrderRequest, UpdateOrderRequest, ORDER_TABLE};
use crate::query::ListQuery;
use crate::response::{self, Pagination};
use crate::service::{list, orders};
use crate::state::AppState;

pub async fn list_orders(
    State(state): State<AppState>,
    Staff(_user): Staff,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let query = ListQuery::from_params(&params);
    let page = list::fetch_page(&state.pool, &ORDER_TABLE, &query).await?;
    let pagination = Pagination::compute(query.page, query.limit, page.total);
    Ok(response::list(page.items, pagination))
}

pub async fn create_order(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let req: CreateOrderRequest = parse_json(body)?;
    let order = orders::create(&state.pool, user.id, &req).await?;
    Ok(response::created(order))
}

pub async fn current_users_orders(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let mine = orders::for_user(&state.pool, user.id).await?;
    Ok(response::ok(mine))
}

pub async fn get_order(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    let order = orders::get(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    if !order.viewable_by(&user) {
        return Err(ApiError::Forbidden(
            "only the order's owner or an admin can view this order".to_string(),
        ));
    }
    Ok(response::ok(order))
}

pub async fn update_order(
    State(state): State<AppState>,
    Staff(_user): Staff,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    let req: UpdateOrderRequest = parse_json(body)?;
    let order = orders::update(&state.pool, id, &req)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(response::ok(order))
}

pub async fn delete_order(
    State(state): State<AppState>,
    Staff(_user): Staff,
    Path(id): Path<String>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    orders::delete(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(response::ok(json!({})))
}
