//! Operational routes: health, readiness, version.

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde_json::json;

use crate::error::ErrorBody;
use crate::response;
use crate::state::AppState;

async fn health() -> impl axum::response::IntoResponse {
    response::ok(json!({"status": "ok"}))
}

/// Probes the pool so load balancers can drain a node with a dead database.
async fn ready(
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, (StatusCode, Json<ErrorBody>)> {
    if sqlx::query("SELECT 1")
        .fetch_optional(&state.pool)
        .await
        .is_err()
    {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorBody {
                success: false,
                error: "database unavailable".to_string(),
            }),
        ));
    }
    Ok(response::ok(json!({"status": "ok", "database": "ok"})))
}

async fn version() -> impl axum::response::IntoResponse {
    response::ok(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// GET /health, GET /ready (with database probe), GET /version.
pub fn common_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/version", get(version))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::testing;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    #[tokio::test]
    async fn health_replies_without_touching_the_database() {
        let app = common_routes(testing::state());
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["status"], "ok");
    }

    #[tokio::test]
    async fn version_reports_the_package() {
        let app = common_routes(testing::state());
        let response = app
            .oneshot(Request::get("/version").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["data"]["name"], "platter");
    }
}
