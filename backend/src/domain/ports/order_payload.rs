//! Serializable order payloads shared by the order driving ports.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Order, OrderLine, OrderStatus};

/// Product projection attached to each line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPayload {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Line item as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLinePayload {
    pub product: ProductPayload,
    pub quantity: u32,
    pub price: i64,
}

/// Order as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPayload {
    pub id: Uuid,
    pub code: String,
    pub lines: Vec<OrderLinePayload>,
    pub total_price: i64,
    pub status: OrderStatus,
}

impl From<&OrderLine> for OrderLinePayload {
    fn from(value: &OrderLine) -> Self {
        let product = match value.product() {
            Some(summary) => ProductPayload {
                id: *summary.id.as_uuid(),
                code: Some(summary.code.clone()),
                name: Some(summary.name.clone()),
            },
            None => ProductPayload {
                id: *value.product_id().as_uuid(),
                code: None,
                name: None,
            },
        };
        Self {
            product,
            quantity: value.quantity(),
            price: value.price().minor_units(),
        }
    }
}

impl From<&Order> for OrderPayload {
    fn from(value: &Order) -> Self {
        Self {
            id: *value.id().as_uuid(),
            code: value.code().as_str().to_owned(),
            lines: value.lines().iter().map(OrderLinePayload::from).collect(),
            total_price: value.total_price().minor_units(),
            status: value.status(),
        }
    }
}

impl From<Order> for OrderPayload {
    fn from(value: Order) -> Self {
        Self::from(&value)
    }
}
