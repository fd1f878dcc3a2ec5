//! Order aggregate, creation draft and merge-style updates.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::UserId;

use super::{
    Money, NewOrderLine, ORDER_CODE_MAX, OrderLifecycleError, OrderLine, OrderStatus,
    OrderValidationError, StatusTransition,
};

/// Store-assigned order identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(Uuid);

impl OrderId {
    /// Wrap a UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for OrderId {
    type Err = uuid::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value).map(Self)
    }
}

/// Human-facing order reference such as `ORD00000042`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrderCode(String);

impl OrderCode {
    /// Validate and construct an order code.
    pub fn new(code: impl Into<String>) -> Result<Self, OrderValidationError> {
        let code = code.into();
        if code.is_empty() {
            return Err(OrderValidationError::EmptyCode);
        }
        if code.trim() != code {
            return Err(OrderValidationError::CodeWhitespace);
        }
        if code.chars().count() > ORDER_CODE_MAX {
            return Err(OrderValidationError::CodeTooLong {
                max: ORDER_CODE_MAX,
            });
        }
        Ok(Self(code))
    }

    /// Borrow the code.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for OrderCode {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for OrderCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for OrderCode {
    type Error = OrderValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<OrderCode> for String {
    fn from(value: OrderCode) -> Self {
        value.0
    }
}

/// Validated input for creating an order.
///
/// The total is the checked sum of line prices and is fixed here; adapters
/// persist it as-is.
///
/// # Examples
///
/// ```
/// use orders_backend::domain::{Money, NewOrderLine, OrderDraft, ProductId, UserId};
/// use uuid::Uuid;
///
/// let lines = vec![
///     NewOrderLine::new(ProductId::from_uuid(Uuid::new_v4()), 2, Money::new(10)?)?,
///     NewOrderLine::new(ProductId::from_uuid(Uuid::new_v4()), 1, Money::new(5)?)?,
/// ];
/// let draft = OrderDraft::new(UserId::random(), lines)?;
/// assert_eq!(draft.total_price().minor_units(), 15);
/// # Ok::<(), orders_backend::domain::OrderValidationError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    user_id: UserId,
    lines: Vec<NewOrderLine>,
    total_price: Money,
}

impl OrderDraft {
    /// Build a draft, rejecting empty line sets and overflowing totals.
    pub fn new(user_id: UserId, lines: Vec<NewOrderLine>) -> Result<Self, OrderValidationError> {
        if lines.is_empty() {
            return Err(OrderValidationError::EmptyLines);
        }
        let total_price = Money::checked_sum(lines.iter().map(NewOrderLine::price))?;
        Ok(Self {
            user_id,
            lines,
            total_price,
        })
    }

    /// Owning user.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Lines in submission order.
    pub fn lines(&self) -> &[NewOrderLine] {
        self.lines.as_slice()
    }

    /// Sum of line prices.
    pub fn total_price(&self) -> Money {
        self.total_price
    }

    /// Initial lifecycle status.
    pub fn status(&self) -> OrderStatus {
        OrderStatus::default()
    }
}

/// Input payload for [`Order::new`], used when rehydrating stored orders.
#[derive(Debug, Clone)]
pub struct OrderRecord {
    pub id: OrderId,
    pub code: OrderCode,
    pub user_id: UserId,
    pub total_price: Money,
    pub status: OrderStatus,
    pub lines: Vec<OrderLine>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Field-level changes for [`Order::apply_update`].
///
/// Absent fields are left untouched; present fields overwrite the stored
/// value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderUpdate {
    pub code: Option<OrderCode>,
    pub status: Option<OrderStatus>,
}

impl OrderUpdate {
    /// Whether the update carries no fields.
    pub fn is_empty(&self) -> bool {
        self.code.is_none() && self.status.is_none()
    }
}

/// A persisted order with its lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    id: OrderId,
    code: OrderCode,
    user_id: UserId,
    total_price: Money,
    status: OrderStatus,
    lines: Vec<OrderLine>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Order {
    /// Rehydrate an order, checking line ownership and the total.
    pub fn new(record: OrderRecord) -> Result<Self, OrderValidationError> {
        if record.lines.is_empty() {
            return Err(OrderValidationError::EmptyLines);
        }
        if let Some(line) = record.lines.iter().find(|line| line.order_id() != record.id) {
            return Err(OrderValidationError::ForeignLine {
                line_order_id: *line.order_id().as_uuid(),
            });
        }
        let expected = Money::checked_sum(record.lines.iter().map(OrderLine::price))?;
        if expected != record.total_price {
            return Err(OrderValidationError::TotalMismatch {
                expected: expected.minor_units(),
                actual: record.total_price.minor_units(),
            });
        }

        Ok(Self {
            id: record.id,
            code: record.code,
            user_id: record.user_id,
            total_price: record.total_price,
            status: record.status,
            lines: record.lines,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }

    /// Order identifier.
    pub fn id(&self) -> OrderId {
        self.id
    }

    /// Human-facing reference.
    pub fn code(&self) -> &OrderCode {
        &self.code
    }

    /// Owning user.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Sum of line prices recorded at creation.
    pub fn total_price(&self) -> Money {
        self.total_price
    }

    /// Current lifecycle state.
    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// Lines ordered by position.
    pub fn lines(&self) -> &[OrderLine] {
        self.lines.as_slice()
    }

    /// Creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Last modification timestamp.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Move the order to `in_progress`.
    ///
    /// Assigning an order that is already in progress is a no-op; assigning
    /// a completed or cancelled order is rejected.
    pub fn assign(&mut self) -> Result<StatusTransition, OrderLifecycleError> {
        let transition = self.status.transition_to(OrderStatus::InProgress)?;
        self.status = OrderStatus::InProgress;
        Ok(transition)
    }

    /// Merge present fields from `update`.
    ///
    /// The status change is validated before any field is written, so a
    /// rejected transition leaves the order untouched. Returns whether any
    /// field changed.
    pub fn apply_update(&mut self, update: &OrderUpdate) -> Result<bool, OrderLifecycleError> {
        let transition = match update.status {
            Some(next) => self.status.transition_to(next)?,
            None => StatusTransition::Unchanged,
        };

        let mut changed = transition.is_change();
        if let StatusTransition::Changed { to, .. } = transition {
            self.status = to;
        }
        if let Some(code) = &update.code
            && *code != self.code
        {
            self.code = code.clone();
            changed = true;
        }
        Ok(changed)
    }
}
