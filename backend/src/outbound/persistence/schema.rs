//! Diesel table definitions for the order schema.
//!
//! These definitions must match `backend/migrations` exactly. When a
//! migration changes a table, update the matching block here (or regenerate
//! it with `diesel print-schema`).

diesel::table! {
    /// Read-only product projection owned by the catalogue service.
    products (id) {
        id -> Uuid,
        code -> Varchar,
        name -> Varchar,
    }
}

diesel::table! {
    /// Order headers.
    ///
    /// `code` defaults to `ORD` followed by a zero-padded sequence value and
    /// `updated_at` is maintained by a trigger.
    orders (id) {
        id -> Uuid,
        code -> Varchar,
        user_id -> Uuid,
        total_price -> Int8,
        status -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Line items. Deleting an order cascades to its lines.
    order_lines (id) {
        id -> Uuid,
        order_id -> Uuid,
        position -> Int4,
        product_id -> Uuid,
        quantity -> Int4,
        price -> Int8,
    }
}

diesel::joinable!(order_lines -> orders (order_id));
diesel::joinable!(order_lines -> products (product_id));

diesel::allow_tables_to_appear_in_same_query!(order_lines, orders, products);
