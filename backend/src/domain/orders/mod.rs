//! Order aggregate, line items, lifecycle status and listing types.
//!
//! An order owns one or more lines and a total price fixed at creation. Lines
//! are never added or removed afterwards; lifecycle changes flow through the
//! status transition table in [`OrderStatus`].

use std::fmt;

use uuid::Uuid;

mod line;
mod listing;
mod money;
mod order;
mod pagination;
mod status;

pub use line::{NewOrderLine, OrderLine, OrderLineRecord, ProductId, ProductSummary};
pub use listing::{
    OrderListFilter, OrderListQuery, OrderPage, OrderSort, OrderSortField,
    ParseOrderSortFieldError, PageRequest, SortDirection, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT,
};
pub use money::Money;
pub use order::{Order, OrderCode, OrderDraft, OrderId, OrderRecord, OrderUpdate};
pub use pagination::Pagination;
pub use status::{OrderLifecycleError, OrderStatus, ParseOrderStatusError, StatusTransition};

/// Maximum length of a human-facing order code.
pub const ORDER_CODE_MAX: usize = 32;

/// Validation errors raised by order constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderValidationError {
    EmptyLines,
    ZeroQuantity { product_id: Uuid },
    NegativeAmount { value: i64 },
    TotalOverflow,
    TotalMismatch { expected: i64, actual: i64 },
    ForeignLine { line_order_id: Uuid },
    EmptyCode,
    CodeTooLong { max: usize },
    CodeWhitespace,
}

impl fmt::Display for OrderValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyLines => write!(f, "order must contain at least one line"),
            Self::ZeroQuantity { product_id } => {
                write!(f, "order line for product {product_id} must have a positive quantity")
            }
            Self::NegativeAmount { value } => {
                write!(f, "amount must be non-negative (got {value})")
            }
            Self::TotalOverflow => write!(f, "order total exceeds the supported range"),
            Self::TotalMismatch { expected, actual } => write!(
                f,
                "order total {actual} does not match the sum of line prices {expected}"
            ),
            Self::ForeignLine { line_order_id } => {
                write!(f, "order line belongs to another order ({line_order_id})")
            }
            Self::EmptyCode => write!(f, "order code must not be empty"),
            Self::CodeTooLong { max } => {
                write!(f, "order code must be at most {max} characters")
            }
            Self::CodeWhitespace => {
                write!(f, "order code must not have surrounding whitespace")
            }
        }
    }
}

impl std::error::Error for OrderValidationError {}
