//! Filtering, sorting and paging for per-user order listings.

use std::fmt;
use std::str::FromStr;

use crate::domain::UserId;

use super::{Order, OrderCode, OrderStatus};

/// Page size used when the caller asks for zero items.
pub const DEFAULT_PAGE_LIMIT: u32 = 20;

/// Largest page size a listing will return.
pub const MAX_PAGE_LIMIT: u32 = 100;

/// Columns an order listing can be sorted by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum OrderSortField {
    #[default]
    Id,
    Code,
    Status,
    TotalPrice,
    CreatedAt,
    UpdatedAt,
}

impl OrderSortField {
    /// Wire name of the field.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Code => "code",
            Self::Status => "status",
            Self::TotalPrice => "total_price",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }
}

impl fmt::Display for OrderSortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a sort field name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported sort field: {value}")]
pub struct ParseOrderSortFieldError {
    value: String,
}

impl FromStr for OrderSortField {
    type Err = ParseOrderSortFieldError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "id" => Ok(Self::Id),
            "code" => Ok(Self::Code),
            "status" => Ok(Self::Status),
            "total_price" => Ok(Self::TotalPrice),
            "created_at" => Ok(Self::CreatedAt),
            "updated_at" => Ok(Self::UpdatedAt),
            other => Err(ParseOrderSortFieldError {
                value: other.to_owned(),
            }),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Resolved ordering for a listing. Ties are always broken by id ascending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderSort {
    pub field: OrderSortField,
    pub direction: SortDirection,
}

impl OrderSort {
    /// Resolve the caller's sort request.
    ///
    /// Without an explicit field the listing falls back to id ascending and
    /// the descending flag is ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use orders_backend::domain::{OrderSort, OrderSortField, SortDirection};
    ///
    /// let sort = OrderSort::resolve(None, true);
    /// assert_eq!(sort.field, OrderSortField::Id);
    /// assert_eq!(sort.direction, SortDirection::Asc);
    /// ```
    pub fn resolve(field: Option<OrderSortField>, descending: bool) -> Self {
        match field {
            Some(field) => Self {
                field,
                direction: if descending {
                    SortDirection::Desc
                } else {
                    SortDirection::Asc
                },
            },
            None => Self::default(),
        }
    }
}

/// A normalised page request: `page >= 1` and `1 <= limit <= MAX_PAGE_LIMIT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Normalise raw paging input. Page zero becomes one, limit zero becomes
    /// [`DEFAULT_PAGE_LIMIT`], and large limits clamp to [`MAX_PAGE_LIMIT`].
    pub fn new(page: u32, limit: u32) -> Self {
        let page = page.max(1);
        let limit = match limit {
            0 => DEFAULT_PAGE_LIMIT,
            other => other.min(MAX_PAGE_LIMIT),
        };
        Self { page, limit }
    }

    /// One-based page number.
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Items per page.
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Rows to skip before this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_LIMIT)
    }
}

/// Equality filters applied to a user's orders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderListFilter {
    pub user_id: UserId,
    pub code: Option<OrderCode>,
    pub status: Option<OrderStatus>,
}

impl OrderListFilter {
    /// Filter matching every order owned by `user_id`.
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id,
            code: None,
            status: None,
        }
    }
}

/// Complete listing request handed to the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderListQuery {
    pub filter: OrderListFilter,
    pub sort: OrderSort,
    pub page: PageRequest,
}

/// One page of orders plus the total count of matching orders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderPage {
    pub orders: Vec<Order>,
    pub total: u64,
}
