//! Menu catalog persistence.

use sqlx::PgPool;
use uuid::Uuid;

use super::unique_violation;
use crate::error::ApiError;
use crate::models::menu::{
    slugify, CreateMenuItemRequest, MenuItem, UpdateMenuItemRequest, DEFAULT_PHOTO,
};

const MENU_COLUMNS: &str = "id, name, slug, type, photo, cost";

fn duplicate_name(e: sqlx::Error) -> ApiError {
    if unique_violation(&e) {
        ApiError::Validation("a menu item with that name already exists".to_string())
    } else {
        ApiError::Db(e)
    }
}

pub async fn get(pool: &PgPool, id: Uuid) -> Result<Option<MenuItem>, ApiError> {
    let sql = format!("SELECT {} FROM menu_items WHERE id = $1", MENU_COLUMNS);
    Ok(sqlx::query_as::<_, MenuItem>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?)
}

/// Insert with the slug derived from the trimmed name.
pub async fn create(pool: &PgPool, req: &CreateMenuItemRequest) -> Result<MenuItem, ApiError> {
    let name = req.name.trim();
    let sql = format!(
        "INSERT INTO menu_items (name, slug, type, photo, cost) \
         VALUES ($1, $2, $3, $4, $5) RETURNING {}",
        MENU_COLUMNS
    );
    sqlx::query_as::<_, MenuItem>(&sql)
        .bind(name)
        .bind(slugify(name))
        .bind(&req.kind)
        .bind(req.photo.as_deref().unwrap_or(DEFAULT_PHOTO))
        .bind(req.cost)
        .fetch_one(pool)
        .await
        .map_err(duplicate_name)
}

/// Partial update; the slug follows the name whenever the name changes.
pub async fn update(
    pool: &PgPool,
    id: Uuid,
    req: &UpdateMenuItemRequest,
) -> Result<Option<MenuItem>, ApiError> {
    let name = req.name.as_deref().map(str::trim);
    let slug = name.map(slugify);
    let sql = format!(
        "UPDATE menu_items SET name = COALESCE($2, name), slug = COALESCE($3, slug), \
         type = COALESCE($4, type), photo = COALESCE($5, photo), cost = COALESCE($6, cost) \
         WHERE id = $1 RETURNING {}",
        MENU_COLUMNS
    );
    sqlx::query_as::<_, MenuItem>(&sql)
        .bind(id)
        .bind(name)
        .bind(slug)
        .bind(req.kind.as_deref())
        .bind(req.photo.as_deref())
        .bind(req.cost)
        .fetch_optional(pool)
        .await
        .map_err(duplicate_name)
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<Option<Uuid>, ApiError> {
    Ok(
        sqlx::query_scalar("DELETE FROM menu_items WHERE id = $1 RETURNING id")
            .bind(id)
            .fetch_optional(pool)
            .await?,
    )
}
