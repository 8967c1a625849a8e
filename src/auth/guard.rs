//! Request guards: bearer/cookie token extraction and role gating.

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use crate::error::ApiError;
use crate::models::user::User;
use crate::service::users;
use crate::state::AppState;

/// Cookie that carries the session token alongside the Authorization header.
pub const TOKEN_COOKIE: &str = "token";

/// Extractor for any authenticated account. The user row is loaded fresh so
/// the role reflects the database, not the token's age.
pub struct AuthUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let token = bearer_token(parts)
            .or_else(|| cookie_token(parts))
            .ok_or_else(denied)?;
        let user_id = state.tokens.verify(&token)?;
        let user = users::find_by_id(&state.pool, user_id)
            .await?
            .ok_or_else(denied)?;
        Ok(AuthUser(user))
    }
}

/// Extractor for catalog managers: publisher or admin accounts only.
pub struct Staff(pub User);

#[async_trait]
impl FromRequestParts<AppState> for Staff {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        if !user.role.is_staff() {
            return Err(ApiError::Forbidden(format!(
                "user role '{}' is not authorized to access this route",
                user.role.as_str()
            )));
        }
        Ok(Staff(user))
    }
}

fn denied() -> ApiError {
    ApiError::Unauthorized("not authorized to access this route".to_string())
}

fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

fn cookie_token(parts: &Parts) -> Option<String> {
    let cookies = parts.headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').map(str::trim).find_map(|pair| {
        let (name, value) = pair.split_once('=')?;
        (name == TOKEN_COOKIE && !value.is_empty()).then(|| value.to_string())
    })
}
