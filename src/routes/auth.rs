//! Account routes.

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::handlers::auth::{
    current_user, forgot_password, login, logout, register, reset_password, update_current_user,
    update_password,
};
use crate::state::AppState;

pub fn auth_routes(state: AppState) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", get(logout))
        .route("/currentuser", get(current_user).put(update_current_user))
        .route("/updatepassword", put(update_password))
        .route("/forgotpassword", post(forgot_password))
        .route("/resetpassword/:resettoken", put(reset_password))
        .with_state(state)
}
