//! Account lifecycle handlers: registration, sessions, profile, and the
//! password flows.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};

use super::parse_json;
use crate::auth::guard::{AuthUser, TOKEN_COOKIE};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::token;
use crate::error::ApiError;
use crate::models::user::{
    validate_password, ForgotPasswordRequest, LoginRequest, RegisterRequest, ResetPasswordRequest,
    UpdatePasswordRequest, UpdateProfileRequest, User,
};
use crate::response::{self, DataBody, TokenBody};
use crate::service::users;
use crate::state::AppState;

/// JWT in the body plus an HttpOnly cookie; every flow that ends in a fresh
/// session replies this way.
fn token_response(state: &AppState, user: &User) -> Result<Response, ApiError> {
    let token = state.tokens.issue(user.id)?;
    let cookie = format!(
        "{}={}; HttpOnly; Path=/; Max-Age={}",
        TOKEN_COOKIE,
        token,
        state.tokens.lifetime_seconds()
    );
    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(TokenBody {
            success: true,
            token,
        }),
    )
        .into_response())
}

pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let req: RegisterRequest = parse_json(body)?;
    req.validate()?;
    let hash = hash_password(&req.password)?;
    let user = users::create(
        &state.pool,
        req.name.trim(),
        &req.email,
        req.role.unwrap_or_default(),
        &hash,
    )
    .await?;
    token_response(&state, &user)
}

pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let req: LoginRequest = parse_json(body)?;
    if req.email.is_empty() || req.password.is_empty() {
        return Err(ApiError::Validation(
            "please provide an email and password".to_string(),
        ));
    }
    // One failure message for unknown email and wrong password alike.
    let user = users::find_by_email(&state.pool, &req.email)
        .await?
        .filter(|u| verify_password(&req.password, &u.password_hash))
        .ok_or_else(|| ApiError::Unauthorized("invalid credentials".to_string()))?;
    token_response(&state, &user)
}

pub async fn logout(AuthUser(_user): AuthUser) -> impl IntoResponse {
    // The JWT itself is stateless; the cookie is overwritten with a dead value.
    let cookie = format!("{}=none; HttpOnly; Path=/; Max-Age=0", TOKEN_COOKIE);
    (
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(DataBody {
            success: true,
            data: json!({}),
        }),
    )
}

pub async fn current_user(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let doc = user_with_orders(&state, user).await?;
    Ok(response::ok(doc))
}

/// Account document carrying the derived list of owned order ids.
async fn user_with_orders(state: &AppState, user: User) -> Result<Value, ApiError> {
    let order_ids = users::order_ids_for_user(&state.pool, user.id).await?;
    let mut doc = serde_json::to_value(&user)
        .map_err(|e| ApiError::Unexpected(format!("serialize user: {}", e)))?;
    if let Value::Object(map) = &mut doc {
        map.insert("orders".to_string(), json!(order_ids));
    }
    Ok(doc)
}

pub async fn update_current_user(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req: UpdateProfileRequest = parse_json(body)?;
    req.validate()?;
    let updated = users::update_profile(
        &state.pool,
        user.id,
        req.name.as_deref().map(str::trim),
        req.email.as_deref(),
    )
    .await?;
    Ok(response::ok(updated))
}

pub async fn update_password(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let req: UpdatePasswordRequest = parse_json(body)?;
    if !verify_password(&req.current_password, &user.password_hash) {
        return Err(ApiError::Unauthorized("password is incorrect".to_string()));
    }
    validate_password(&req.new_password)?;
    let hash = hash_password(&req.new_password)?;
    users::set_password(&state.pool, user.id, &hash).await?;
    token_response(&state, &user)
}

pub async fn forgot_password(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req: ForgotPasswordRequest = parse_json(body)?;
    let user = users::find_by_email(&state.pool, &req.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("there is no user with that email".to_string()))?;

    let reset = token::issue_reset_token();
    users::store_reset_token(&state.pool, user.id, &reset.digest, reset.expires_at).await?;

    let reset_url = format!(
        "{}/{}",
        state.config.reset_url_base.trim_end_matches('/'),
        reset.plaintext
    );
    let message = format!(
        "You are receiving this email because you (or someone else) has requested \
         the reset of a password. Please make a PUT request to:\n\n{}",
        reset_url
    );
    if let Err(err) = state
        .mailer
        .send(&user.email, "Password Reset Token", &message)
        .await
    {
        tracing::error!(error = %err, "reset email failed");
        if let Err(rollback) = users::clear_reset_token(&state.pool, user.id).await {
            tracing::warn!(error = %rollback, "reset token rollback failed");
        }
        return Err(ApiError::Unexpected("email could not be sent".to_string()));
    }
    Ok(response::ok(json!("Email sent")))
}

pub async fn reset_password(
    State(state): State<AppState>,
    Path(resettoken): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let req: ResetPasswordRequest = parse_json(body)?;
    validate_password(&req.password)?;
    let digest = token::reset_token_digest(&resettoken);
    let user = users::find_by_reset_token(&state.pool, &digest, Utc::now())
        .await?
        .ok_or(ApiError::InvalidToken)?;
    let hash = hash_password(&req.password)?;
    let user = users::reset_password(&state.pool, user.id, &hash).await?;
    token_response(&state, &user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token::TokenService;
    use crate::config::AppConfig;
    use crate::mail::Mailer;
    use async_trait::async_trait;
    use std::sync::Arc;
    use uuid::Uuid;

    struct NullMailer;

    #[async_trait]
    impl Mailer for NullMailer {
        async fn send(&self, _to: &str, _subject: &str, _message: &str) -> Result<(), ApiError> {
            Ok(())
        }
    }

    fn test_state() -> AppState {
        let config = AppConfig {
            port: 0,
            database_url: "postgres://localhost/platter_test".to_string(),
            jwt_secret: "test-secret".to_string(),
            jwt_lifetime_hours: 24,
            reset_url_base: "http://localhost/api/auth/resetpassword".to_string(),
            smtp_url: "smtp://localhost:25".to_string(),
            mail_from: "noreply@platter.local".to_string(),
        };
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .unwrap();
        AppState {
            pool,
            tokens: TokenService::new(config.jwt_secret.as_bytes(), config.jwt_lifetime_hours),
            config: Arc::new(config),
            mailer: Arc::new(NullMailer),
        }
    }

    fn test_user() -> User {
        User {
            id: Uuid::new_v4(),
            name: "Pat".to_string(),
            email: "pat@example.com".to_string(),
            role: Default::default(),
            password_hash: String::new(),
            reset_token_hash: None,
            reset_token_expires_at: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn session_response_sets_cookie_matching_body_token() {
        let state = test_state();
        let user = test_user();
        let response = token_response(&state, &user).unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(cookie.starts_with("token="));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=86400"));

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], true);

        let token_in_cookie = cookie
            .trim_start_matches("token=")
            .split(';')
            .next()
            .unwrap();
        assert_eq!(body["token"], token_in_cookie);
        assert_eq!(state.tokens.verify(token_in_cookie).unwrap(), user.id);
    }

    #[tokio::test]
    async fn logout_expires_the_cookie() {
        let response = logout(AuthUser(test_user())).await.into_response();
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(cookie.starts_with("token=none"));
        assert!(cookie.contains("Max-Age=0"));
    }
}
