//! Menu catalog routes.

use axum::{routing::get, Router};

use crate::handlers::menu::{create_item, delete_item, get_item, list_items, update_item};
use crate::state::AppState;

pub fn menu_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_items).post(create_item))
        .route("/:id", get(get_item).put(update_item).delete(delete_item))
        .with_state(state)
}
