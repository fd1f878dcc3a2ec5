//! Order line items and the product projection they reference.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Money, OrderId, OrderValidationError};

/// Identifier of a product owned by the catalogue service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(Uuid);

impl ProductId {
    /// Wrap a UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for ProductId {
    type Err = uuid::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value).map(Self)
    }
}

/// Read-only product projection loaded alongside order lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub id: ProductId,
    pub code: String,
    pub name: String,
}

/// A validated line item submitted for a new order.
///
/// # Examples
///
/// ```
/// use orders_backend::domain::{Money, NewOrderLine, ProductId};
/// use uuid::Uuid;
///
/// let line = NewOrderLine::new(ProductId::from_uuid(Uuid::new_v4()), 2, Money::new(10)?)?;
/// assert_eq!(line.quantity(), 2);
/// # Ok::<(), orders_backend::domain::OrderValidationError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderLine {
    product_id: ProductId,
    quantity: u32,
    price: Money,
}

impl NewOrderLine {
    /// Validate a candidate line. Quantities must be positive.
    pub fn new(
        product_id: ProductId,
        quantity: u32,
        price: Money,
    ) -> Result<Self, OrderValidationError> {
        if quantity == 0 {
            return Err(OrderValidationError::ZeroQuantity {
                product_id: *product_id.as_uuid(),
            });
        }
        Ok(Self {
            product_id,
            quantity,
            price,
        })
    }

    /// Referenced product.
    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    /// Ordered quantity.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Line price in minor units.
    pub fn price(&self) -> Money {
        self.price
    }
}

/// Input payload for [`OrderLine::new`], used when rehydrating stored lines.
#[derive(Debug, Clone)]
pub struct OrderLineRecord {
    pub id: Uuid,
    pub order_id: OrderId,
    pub position: u32,
    pub product_id: ProductId,
    pub product: Option<ProductSummary>,
    pub quantity: u32,
    pub price: Money,
}

/// A persisted line belonging to exactly one order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLine {
    id: Uuid,
    order_id: OrderId,
    position: u32,
    product_id: ProductId,
    product: Option<ProductSummary>,
    quantity: u32,
    price: Money,
}

impl OrderLine {
    /// Rehydrate a stored line, re-checking the quantity invariant.
    pub fn new(record: OrderLineRecord) -> Result<Self, OrderValidationError> {
        if record.quantity == 0 {
            return Err(OrderValidationError::ZeroQuantity {
                product_id: *record.product_id.as_uuid(),
            });
        }
        Ok(Self {
            id: record.id,
            order_id: record.order_id,
            position: record.position,
            product_id: record.product_id,
            product: record.product,
            quantity: record.quantity,
            price: record.price,
        })
    }

    /// Store-assigned line identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Owning order.
    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    /// Zero-based position within the order.
    pub fn position(&self) -> u32 {
        self.position
    }

    /// Referenced product.
    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    /// Product projection, when loaded.
    pub fn product(&self) -> Option<&ProductSummary> {
        self.product.as_ref()
    }

    /// Ordered quantity.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Line price in minor units.
    pub fn price(&self) -> Money {
        self.price
    }
}
