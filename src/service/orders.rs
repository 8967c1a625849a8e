//! Order persistence. Ownership always comes from the caller's account, never
//! the request body.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::order::{CreateOrderRequest, Order, UpdateOrderRequest};

const ORDER_COLUMNS: &str = "id, menu_items, subtotal, tax, total, created_at, user_id";

pub async fn create(
    pool: &PgPool,
    user_id: Uuid,
    req: &CreateOrderRequest,
) -> Result<Order, ApiError> {
    let sql = format!(
        "INSERT INTO orders (menu_items, subtotal, tax, total, user_id) \
         VALUES ($1, $2, $3, $4, $5) RETURNING {}",
        ORDER_COLUMNS
    );
    Ok(sqlx::query_as::<_, Order>(&sql)
        .bind(&req.menu_items)
        .bind(req.subtotal)
        .bind(req.tax)
        .bind(req.total)
        .bind(user_id)
        .fetch_one(pool)
        .await?)
}

pub async fn get(pool: &PgPool, id: Uuid) -> Result<Option<Order>, ApiError> {
    let sql = format!("SELECT {} FROM orders WHERE id = $1", ORDER_COLUMNS);
    Ok(sqlx::query_as::<_, Order>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?)
}

pub async fn for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Order>, ApiError> {
    let sql = format!(
        "SELECT {} FROM orders WHERE user_id = $1 ORDER BY created_at",
        ORDER_COLUMNS
    );
    Ok(sqlx::query_as::<_, Order>(&sql)
        .bind(user_id)
        .fetch_all(pool)
        .await?)
}

pub async fn update(
    pool: &PgPool,
    id: Uuid,
    req: &UpdateOrderRequest,
) -> Result<Option<Order>, ApiError> {
    let sql = format!(
        "UPDATE orders SET menu_items = COALESCE($2, menu_items), \
         subtotal = COALESCE($3, subtotal), tax = COALESCE($4, tax), \
         total = COALESCE($5, total) WHERE id = $1 RETURNING {}",
        ORDER_COLUMNS
    );
    Ok(sqlx::query_as::<_, Order>(&sql)
        .bind(id)
        .bind(req.menu_items.as_deref())
        .bind(req.subtotal)
        .bind(req.tax)
        .bind(req.total)
        .fetch_optional(pool)
        .await?)
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<Option<Uuid>, ApiError> {
    Ok(
        sqlx::query_scalar("DELETE FROM orders WHERE id = $1 RETURNING id")
            .bind(id)
            .fetch_optional(pool)
            .await?,
    )
}
