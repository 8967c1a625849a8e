//! Schema DDL applied at startup. Everything here is idempotent so a restart
//! against an existing database is a no-op.

use std::str::FromStr;

use sqlx::{ConnectOptions, PgPool};

use crate::error::ApiError;

/// Create the users, menu_items, and orders tables plus the role enum.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), ApiError> {
    // CREATE TYPE has no IF NOT EXISTS; a duplicate on restart is fine.
    let _ = sqlx::query("CREATE TYPE user_role AS ENUM ('user', 'publisher', 'admin')")
        .execute(pool)
        .await;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            role user_role NOT NULL DEFAULT 'user',
            password_hash TEXT NOT NULL,
            reset_token_hash TEXT,
            reset_token_expires_at TIMESTAMPTZ,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS menu_items (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            name TEXT NOT NULL UNIQUE,
            slug TEXT NOT NULL,
            type TEXT NOT NULL,
            photo TEXT NOT NULL DEFAULT 'no-photo.jpg',
            cost DOUBLE PRECISION
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS orders (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            menu_items UUID[] NOT NULL DEFAULT '{}',
            subtotal DOUBLE PRECISION,
            tax DOUBLE PRECISION,
            total DOUBLE PRECISION,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            user_id UUID NOT NULL REFERENCES users(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS orders_user_id_idx ON orders (user_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS users_reset_token_hash_idx ON users (reset_token_hash)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Ensure the database in `database_url` exists; create it if not. Connects to
/// the default `postgres` database to run CREATE DATABASE. Call before creating
/// the main pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), ApiError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)
        .map_err(|e| ApiError::Validation(format!("invalid DATABASE_URL: {}", e)))?;
    let mut conn: sqlx::PgConnection = opts.connect().await.map_err(ApiError::Db)?;
    let exists: (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
            .bind(&db_name)
            .fetch_one(&mut conn)
            .await
            .map_err(ApiError::Db)?;
    if !exists.0 {
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await
            .map_err(ApiError::Db)?;
    }
    Ok(())
}

fn parse_db_name_from_url(url: &str) -> Result<(String, String), ApiError> {
    let path_start = url
        .rfind('/')
        .ok_or_else(|| ApiError::Validation("DATABASE_URL: no path".to_string()))?
        + 1;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let db_name = path_and_query.split('?').next().unwrap_or("").trim();
    let base = url.get(..path_start).unwrap_or(url);
    let admin_url = format!("{}postgres", base);
    Ok((admin_url, db_name.to_string()))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('\\', "\\\\").replace('"', "\\\""))
}
