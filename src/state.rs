//! Shared application state for all routes.

use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::token::TokenService;
use crate::config::AppConfig;
use crate::mail::Mailer;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<AppConfig>,
    pub tokens: TokenService,
    pub mailer: Arc<dyn Mailer>,
}
