//! Password hashing, session and reset tokens, and request guards.

pub mod guard;
pub mod password;
pub mod token;
