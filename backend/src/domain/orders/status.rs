//! Order lifecycle status and its transition table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle state of an order.
///
/// Only `pending -> in_progress` is driven by this crate. `completed` and
/// `cancelled` may be present in storage but no operation moves an order
/// into them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Initial state of every new order.
    #[default]
    Pending,
    /// The order has been assigned for fulfilment.
    InProgress,
    /// Fulfilment finished.
    Completed,
    /// The order was abandoned.
    Cancelled,
}

/// Allowed `(from, to)` status changes. Re-entering the current state is
/// always accepted as a no-op and is not listed here.
const TRANSITIONS: &[(OrderStatus, OrderStatus)] =
    &[(OrderStatus::Pending, OrderStatus::InProgress)];

/// Outcome of applying a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTransition {
    /// The status moved from one state to another.
    Changed {
        /// Previous state.
        from: OrderStatus,
        /// New state.
        to: OrderStatus,
    },
    /// The requested state equals the current one.
    Unchanged,
}

impl StatusTransition {
    /// Whether the transition requires persisting the order.
    pub fn is_change(self) -> bool {
        matches!(self, Self::Changed { .. })
    }
}

/// Errors raised when a lifecycle operation is not allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum OrderLifecycleError {
    /// The transition table has no entry for this change.
    #[error("order status cannot move from {from} to {to}")]
    TransitionRejected {
        /// Current state.
        from: OrderStatus,
        /// Requested state.
        to: OrderStatus,
    },
}

impl OrderStatus {
    /// Stable storage and wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether the table allows moving from `self` to `next`.
    pub fn can_transition_to(self, next: Self) -> bool {
        self == next || TRANSITIONS.contains(&(self, next))
    }

    /// Validate a move from `self` to `next`.
    ///
    /// # Examples
    ///
    /// ```
    /// use orders_backend::domain::{OrderStatus, StatusTransition};
    ///
    /// let outcome = OrderStatus::Pending.transition_to(OrderStatus::InProgress)?;
    /// assert!(outcome.is_change());
    /// assert_eq!(
    ///     OrderStatus::InProgress.transition_to(OrderStatus::InProgress)?,
    ///     StatusTransition::Unchanged
    /// );
    /// assert!(OrderStatus::Completed.transition_to(OrderStatus::InProgress).is_err());
    /// # Ok::<(), orders_backend::domain::OrderLifecycleError>(())
    /// ```
    pub fn transition_to(self, next: Self) -> Result<StatusTransition, OrderLifecycleError> {
        if self == next {
            return Ok(StatusTransition::Unchanged);
        }
        if self.can_transition_to(next) {
            Ok(StatusTransition::Changed {
                from: self,
                to: next,
            })
        } else {
            Err(OrderLifecycleError::TransitionRejected {
                from: self,
                to: next,
            })
        }
    }
}

/// Error returned when parsing an order status from string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid order status: {value}")]
pub struct ParseOrderStatusError {
    value: String,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ParseOrderStatusError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(ParseOrderStatusError {
                value: other.to_owned(),
            }),
        }
    }
}
