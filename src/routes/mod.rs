//! Router assembly for the auth, menu, and orders surfaces.

pub mod auth;
pub mod common;
pub mod menu;
pub mod orders;

pub use auth::auth_routes;
pub use common::common_routes;
pub use menu::menu_routes;
pub use orders::order_routes;
