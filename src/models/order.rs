//! Orders: the persisted row, ownership rule, and query column spec.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::{Role, User};
use crate::query::{ColumnDef, ColumnKind, TableSpec};

/// Columns the list engine may filter, sort, and project on. The default
/// `type` sort key matches nothing here and falls through to the key column.
pub static ORDER_TABLE: TableSpec = TableSpec {
    table: "orders",
    pk: "id",
    columns: &[
        ColumnDef {
            api: "id",
            column: "id",
            kind: ColumnKind::Uuid,
        },
        ColumnDef {
            api: "menuItems",
            column: "menu_items",
            kind: ColumnKind::UuidArray,
        },
        ColumnDef {
            api: "subtotal",
            column: "subtotal",
            kind: ColumnKind::Float,
        },
        ColumnDef {
            api: "tax",
            column: "tax",
            kind: ColumnKind::Float,
        },
        ColumnDef {
            api: "total",
            column: "total",
            kind: ColumnKind::Float,
        },
        ColumnDef {
            api: "createdAt",
            column: "created_at",
            kind: ColumnKind::Timestamp,
        },
        ColumnDef {
            api: "user",
            column: "user_id",
            kind: ColumnKind::Uuid,
        },
    ],
};

#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub menu_items: Vec<Uuid>,
    pub subtotal: Option<f64>,
    pub tax: Option<f64>,
    pub total: Option<f64>,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "user")]
    pub user_id: Uuid,
}

impl Order {
    /// The owner and admins may read an order; other accounts may not.
    pub fn viewable_by(&self, user: &User) -> bool {
        self.user_id == user.id || user.role == Role::Admin
    }
}

/// No user field: ownership is stamped from the authenticated caller, so a
/// client-supplied `user` is dropped on the floor.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub menu_items: Vec<Uuid>,
    #[serde(default)]
    pub subtotal: Option<f64>,
    #[serde(default)]
    pub tax: Option<f64>,
    #[serde(default)]
    pub total: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderRequest {
    pub menu_items: Option<Vec<Uuid>>,
    pub subtotal: Option<f64>,
    pub tax: Option<f64>,
    pub total: Option<f64>,
}
