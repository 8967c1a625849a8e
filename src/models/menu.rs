//! Menu catalog model, slug derivation, and its query column spec.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::query::{ColumnDef, ColumnKind, TableSpec};

pub const MAX_NAME_LEN: usize = 256;
pub const MAX_TYPE_LEN: usize = 10;
pub const DEFAULT_PHOTO: &str = "no-photo.jpg";

/// Columns the list engine may filter, sort, and project on.
pub static MENU_TABLE: TableSpec = TableSpec {
    table: "menu_items",
    pk: "id",
    columns: &[
        ColumnDef {
            api: "id",
            column: "id",
            kind: ColumnKind::Uuid,
        },
        ColumnDef {
            api: "name",
            column: "name",
            kind: ColumnKind::Text,
        },
        ColumnDef {
            api: "slug",
            column: "slug",
            kind: ColumnKind::Text,
        },
        ColumnDef {
            api: "type",
            column: "type",
            kind: ColumnKind::Text,
        },
        ColumnDef {
            api: "photo",
            column: "photo",
            kind: ColumnKind::Text,
        },
        ColumnDef {
            api: "cost",
            column: "cost",
            kind: ColumnKind::Float,
        },
    ],
};

#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct MenuItem {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
    pub photo: String,
    pub cost: Option<f64>,
}

/// Lowercase URL-safe slug from a display name. Runs of separators collapse
/// to one hyphen; apostrophes vanish rather than hyphenate.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(c.to_ascii_lowercase());
            pending_hyphen = false;
        } else if c != '\'' {
            pending_hyphen = true;
        }
    }
    slug
}

fn validate_name(name: &str) -> Result<(), ApiError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ApiError::Validation("name is required".to_string()));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(ApiError::Validation(format!(
            "name must be at most {} characters",
            MAX_NAME_LEN
        )));
    }
    Ok(())
}

fn validate_kind(kind: &str) -> Result<(), ApiError> {
    if kind.trim().is_empty() {
        return Err(ApiError::Validation("type is required".to_string()));
    }
    if kind.chars().count() > MAX_TYPE_LEN {
        return Err(ApiError::Validation(format!(
            "type must be at most {} characters",
            MAX_TYPE_LEN
        )));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct CreateMenuItemRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub cost: Option<f64>,
}

impl CreateMenuItemRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        validate_name(&self.name)?;
        validate_kind(&self.kind)
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateMenuItemRequest {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub photo: Option<String>,
    pub cost: Option<f64>,
}

impl UpdateMenuItemRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(kind) = &self.kind {
            validate_kind(kind)?;
        }
        Ok(())
    }
}
