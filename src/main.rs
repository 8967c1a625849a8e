//! Server binary: wires config, database, mailer, and routes.

use std::sync::Arc;

use axum::Router;
use platter::{
    auth_routes, common_routes, ensure_database_exists, ensure_schema, menu_routes, order_routes,
    AppConfig, AppState, SmtpMailer, TokenService,
};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::limit::RequestBodyLimitLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("platter=info")),
        )
        .init();

    let config = AppConfig::from_env()?;

    ensure_database_exists(&config.database_url).await?;
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    ensure_schema(&pool).await?;

    let tokens = TokenService::new(config.jwt_secret.as_bytes(), config.jwt_lifetime_hours);
    let mailer = SmtpMailer::from_config(&config)?;
    let port = config.port;
    let state = AppState {
        pool,
        config: Arc::new(config),
        tokens,
        mailer: Arc::new(mailer),
    };

    let app = Router::new()
        .merge(common_routes(state.clone()))
        .nest("/api/auth", auth_routes(state.clone()))
        .nest("/api/food", menu_routes(state.clone()))
        .nest("/api/orders", order_routes(state))
        .layer(RequestBodyLimitLayer::new(1024 * 1024));

    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install ctrl-c handler");
        tracing::info!("received ctrl-c, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        signal(SignalKind::terminate())
            .expect("failed to install terminate handler")
            .recv()
            .await;
        tracing::info!("received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
