//! Driving port for order reads.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Error, Pagination, UserId};

use super::OrderPayload;

/// Request for a single order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetOrderRequest {
    pub order_id: Uuid,
}

/// Response containing a single order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetOrderResponse {
    pub order: OrderPayload,
}

/// Request for a page of a user's orders.
///
/// Empty strings in `code`, `status` and `order_by` mean "not set". Paging
/// values are normalised rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListOrdersRequest {
    pub user_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,
    #[serde(default)]
    pub order_desc: bool,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub limit: u32,
}

impl ListOrdersRequest {
    /// First page of every order owned by `user_id`, default sort.
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id,
            code: None,
            status: None,
            order_by: None,
            order_desc: false,
            page: 1,
            limit: 0,
        }
    }
}

/// A page of orders and its metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListOrdersResponse {
    pub orders: Vec<OrderPayload>,
    pub pagination: Pagination,
}

/// Driving port for order read operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderQuery: Send + Sync {
    /// Fetch one order with its lines and product projections.
    async fn get_order(&self, request: GetOrderRequest) -> Result<GetOrderResponse, Error>;

    /// List a user's orders with filters, sorting and pagination.
    async fn list_orders_for_user(
        &self,
        request: ListOrdersRequest,
    ) -> Result<ListOrdersResponse, Error>;
}

/// Fixture query implementation returning no orders.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureOrderQuery;

#[async_trait]
impl OrderQuery for FixtureOrderQuery {
    async fn get_order(&self, request: GetOrderRequest) -> Result<GetOrderResponse, Error> {
        Err(Error::not_found(format!(
            "order {} not found",
            request.order_id
        )))
    }

    async fn list_orders_for_user(
        &self,
        request: ListOrdersRequest,
    ) -> Result<ListOrdersResponse, Error> {
        let page = crate::domain::PageRequest::new(request.page, request.limit);
        Ok(ListOrdersResponse {
            orders: Vec::new(),
            pagination: Pagination::new(page, 0),
        })
    }
}
