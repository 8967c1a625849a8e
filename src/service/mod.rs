//! Storage operations per resource plus the shared list execution.

pub mod list;
pub mod menu;
pub mod orders;
pub mod users;

/// PostgreSQL unique-constraint violation, surfaced to callers as validation.
pub(crate) fn unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}
