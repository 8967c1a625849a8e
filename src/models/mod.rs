//! Domain models and request DTOs.

pub mod menu;
pub mod order;
pub mod user;
