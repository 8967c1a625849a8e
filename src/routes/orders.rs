//! Order routes. The static /currentuser segment routes ahead of /:id.

use axum::{routing::get, Router};

use crate::handlers::orders::{
    create_order, current_users_orders, delete_order, get_order, list_orders, update_order,
};
use crate::state::AppState;

pub fn order_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route("/currentuser", get(current_users_orders))
        .route("/:id", get(get_order).put(update_order).delete(delete_order))
        .with_state(state)
}
