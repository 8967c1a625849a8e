//! User persistence: accounts, credentials, and the reset-token lifecycle.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::unique_violation;
use crate::error::ApiError;
use crate::models::user::{Role, User};

const USER_COLUMNS: &str =
    "id, name, email, role, password_hash, reset_token_hash, reset_token_expires_at, created_at";

fn duplicate_email(e: sqlx::Error) -> ApiError {
    if unique_violation(&e) {
        ApiError::Validation("email already registered".to_string())
    } else {
        ApiError::Db(e)
    }
}

pub async fn create(
    pool: &PgPool,
    name: &str,
    email: &str,
    role: Role,
    password_hash: &str,
) -> Result<User, ApiError> {
    let sql = format!(
        "INSERT INTO users (name, email, role, password_hash) VALUES ($1, $2, $3, $4) RETURNING {}",
        USER_COLUMNS
    );
    sqlx::query_as::<_, User>(&sql)
        .bind(name)
        .bind(email)
        .bind(role)
        .bind(password_hash)
        .fetch_one(pool)
        .await
        .map_err(duplicate_email)
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, ApiError> {
    let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
    Ok(sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?)
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, ApiError> {
    let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
    Ok(sqlx::query_as::<_, User>(&sql)
        .bind(email)
        .fetch_optional(pool)
        .await?)
}

/// Name/email only. The password hash is deliberately out of reach here.
pub async fn update_profile(
    pool: &PgPool,
    id: Uuid,
    name: Option<&str>,
    email: Option<&str>,
) -> Result<User, ApiError> {
    let sql = format!(
        "UPDATE users SET name = COALESCE($2, name), email = COALESCE($3, email) \
         WHERE id = $1 RETURNING {}",
        USER_COLUMNS
    );
    sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .bind(name)
        .bind(email)
        .fetch_one(pool)
        .await
        .map_err(duplicate_email)
}

pub async fn set_password(pool: &PgPool, id: Uuid, password_hash: &str) -> Result<(), ApiError> {
    sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
        .bind(id)
        .bind(password_hash)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn store_reset_token(
    pool: &PgPool,
    id: Uuid,
    digest: &str,
    expires_at: DateTime<Utc>,
) -> Result<(), ApiError> {
    sqlx::query("UPDATE users SET reset_token_hash = $2, reset_token_expires_at = $3 WHERE id = $1")
        .bind(id)
        .bind(digest)
        .bind(expires_at)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn clear_reset_token(pool: &PgPool, id: Uuid) -> Result<(), ApiError> {
    sqlx::query("UPDATE users SET reset_token_hash = NULL, reset_token_expires_at = NULL WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

fn find_by_reset_token_sql() -> String {
    format!(
        "SELECT {} FROM users WHERE reset_token_hash = $1 AND reset_token_expires_at > $2",
        USER_COLUMNS
    )
}

/// The account holding an unexpired reset token with this digest, if any.
pub async fn find_by_reset_token(
    pool: &PgPool,
    digest: &str,
    now: DateTime<Utc>,
) -> Result<Option<User>, ApiError> {
    Ok(sqlx::query_as::<_, User>(&find_by_reset_token_sql())
        .bind(digest)
        .bind(now)
        .fetch_optional(pool)
        .await?)
}

fn reset_password_sql() -> String {
    format!(
        "UPDATE users SET password_hash = $2, reset_token_hash = NULL, \
         reset_token_expires_at = NULL WHERE id = $1 RETURNING {}",
        USER_COLUMNS
    )
}

/// New password and reset-field cleanup land in one statement, so a consumed
/// token can never be replayed against the password it set.
pub async fn reset_password(
    pool: &PgPool,
    id: Uuid,
    password_hash: &str,
) -> Result<User, ApiError> {
    Ok(sqlx::query_as::<_, User>(&reset_password_sql())
        .bind(id)
        .bind(password_hash)
        .fetch_one(pool)
        .await?)
}

pub async fn order_ids_for_user(pool: &PgPool, id: Uuid) -> Result<Vec<Uuid>, ApiError> {
    Ok(
        sqlx::query_scalar("SELECT id FROM orders WHERE user_id = $1 ORDER BY created_at")
            .bind(id)
            .fetch_all(pool)
            .await?,
    )
}
