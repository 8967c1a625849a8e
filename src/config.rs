//! Environment-driven runtime configuration.

use std::env;
use std::fmt::Display;
use std::str::FromStr;

use crate::error::ApiError;

/// Settings read once at startup. Everything except `JWT_SECRET` has a
/// development default.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_lifetime_hours: i64,
    pub reset_url_base: String,
    pub smtp_url: String,
    pub mail_from: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ApiError> {
        Ok(Self {
            port: parsed_or("PORT", 3000),
            database_url: or_default("DATABASE_URL", "postgres://localhost/platter"),
            jwt_secret: required("JWT_SECRET")?,
            jwt_lifetime_hours: parsed_or("JWT_LIFETIME_HOURS", 24),
            reset_url_base: or_default(
                "RESET_URL_BASE",
                "http://localhost:3000/api/auth/resetpassword",
            ),
            smtp_url: or_default("SMTP_URL", "smtp://localhost:25"),
            mail_from: or_default("MAIL_FROM", "noreply@platter.local"),
        })
    }
}

fn or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| {
        tracing::info!("{} not set, using default: {}", key, default);
        default.to_string()
    })
}

fn parsed_or<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
{
    match env::var(key) {
        Ok(raw) => match raw.parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!("invalid {} value {:?}, using default: {}", key, raw, default);
                default
            }
        },
        Err(_) => default,
    }
}

fn required(key: &str) -> Result<String, ApiError> {
    env::var(key).map_err(|_| ApiError::Unexpected(format!("{} must be set", key)))
}
