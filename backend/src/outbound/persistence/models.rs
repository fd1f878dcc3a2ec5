//! Internal Diesel row structs for order persistence.
//!
//! These types never leave the persistence layer; the repository converts
//! them into validated domain values.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{order_lines, orders, products};

/// Row struct for reading from the orders table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct OrderRow {
    pub id: Uuid,
    pub code: String,
    pub user_id: Uuid,
    pub total_price: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for new orders. Id, code and timestamps come from
/// column defaults.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = orders)]
pub(crate) struct NewOrderRow<'a> {
    pub user_id: Uuid,
    pub total_price: i64,
    pub status: &'a str,
}

/// Changeset for the mutable order columns.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = orders)]
pub(crate) struct OrderChangeset<'a> {
    pub code: &'a str,
    pub status: &'a str,
}

/// Row struct for reading from the order_lines table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = order_lines)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct OrderLineRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub position: i32,
    pub product_id: Uuid,
    pub quantity: i32,
    pub price: i64,
}

/// Insertable struct for line batches.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = order_lines)]
pub(crate) struct NewOrderLineRow {
    pub order_id: Uuid,
    pub position: i32,
    pub product_id: Uuid,
    pub quantity: i32,
    pub price: i64,
}

/// Row struct for the product projection.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProductRow {
    pub id: Uuid,
    pub code: String,
    pub name: String,
}
