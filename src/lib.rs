//! Platter: food-ordering REST backend library.

pub mod auth;
pub mod config;
pub mod error;
pub mod mail;
pub mod models;
pub mod query;
pub mod response;
pub mod state;
pub mod store;
pub mod service;
pub mod handlers;
pub mod routes;

pub use auth::token::TokenService;
pub use config::AppConfig;
pub use error::ApiError;
pub use mail::{Mailer, SmtpMailer};
pub use state::AppState;
pub use store::{ensure_database_exists, ensure_schema};
pub use routes::{auth_routes, common_routes, menu_routes, order_routes};
