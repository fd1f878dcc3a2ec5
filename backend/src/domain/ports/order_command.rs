//! Driving port for order mutations.
//!
//! Creation is atomic across the order and its lines. Updates merge optional
//! fields and route status changes through the lifecycle table.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    Error, Money, NewOrderLine, OrderDraft, OrderStatus, OrderValidationError, ProductId, UserId,
};

use super::{OrderLinePayload, OrderPayload, ProductPayload};

/// Line item submitted with a create request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOrderLineRequest {
    pub product_id: Uuid,
    pub quantity: u32,
    pub price: i64,
}

/// Request to create an order for a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub user_id: UserId,
    pub lines: Vec<CreateOrderLineRequest>,
}

impl TryFrom<CreateOrderRequest> for OrderDraft {
    type Error = OrderValidationError;

    fn try_from(value: CreateOrderRequest) -> Result<Self, Self::Error> {
        let lines = value
            .lines
            .into_iter()
            .map(|line| {
                NewOrderLine::new(
                    ProductId::from_uuid(line.product_id),
                    line.quantity,
                    Money::new(line.price)?,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;
        OrderDraft::new(value.user_id, lines)
    }
}

/// Response from creating an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOrderResponse {
    pub order: OrderPayload,
}

/// Request to merge fields into an existing order.
///
/// Absent fields are left untouched. `status` is parsed against the known
/// lifecycle states.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateOrderRequest {
    pub order_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Response from updating an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateOrderResponse {
    pub order: OrderPayload,
}

/// Request to move an order to `in_progress`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignOrderRequest {
    pub order_id: Uuid,
}

/// Response from assigning an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignOrderResponse {
    pub order_id: Uuid,
    pub status: OrderStatus,
    /// Whether the assignment changed the stored status.
    pub changed: bool,
}

/// Driving port for order write operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderCommand: Send + Sync {
    /// Create an order and its lines in one transaction.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// # use uuid::Uuid;
    /// # use orders_backend::domain::UserId;
    /// # use orders_backend::domain::ports::{
    /// #     CreateOrderLineRequest, CreateOrderRequest, FixtureOrderCommand, OrderCommand,
    /// # };
    /// # async fn example() -> Result<(), orders_backend::domain::Error> {
    /// let command = FixtureOrderCommand;
    /// let response = command
    ///     .create_order(CreateOrderRequest {
    ///         user_id: UserId::random(),
    ///         lines: vec![CreateOrderLineRequest {
    ///             product_id: Uuid::new_v4(),
    ///             quantity: 2,
    ///             price: 10,
    ///         }],
    ///     })
    ///     .await?;
    /// assert_eq!(response.order.total_price, 10);
    /// # Ok(())
    /// # }
    /// ```
    async fn create_order(&self, request: CreateOrderRequest)
    -> Result<CreateOrderResponse, Error>;

    /// Merge optional fields into an existing order and save it.
    async fn update_order(&self, request: UpdateOrderRequest)
    -> Result<UpdateOrderResponse, Error>;

    /// Move an order from `pending` to `in_progress`.
    async fn assign_order(&self, request: AssignOrderRequest)
    -> Result<AssignOrderResponse, Error>;
}

/// Fixture command implementation for tests that do not need persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureOrderCommand;

#[async_trait]
impl OrderCommand for FixtureOrderCommand {
    async fn create_order(
        &self,
        request: CreateOrderRequest,
    ) -> Result<CreateOrderResponse, Error> {
        let draft = OrderDraft::try_from(request)
            .map_err(|err| Error::invalid_request(format!("invalid order payload: {err}")))?;

        Ok(CreateOrderResponse {
            order: OrderPayload {
                id: Uuid::new_v4(),
                code: "ORD00000001".to_owned(),
                lines: draft
                    .lines()
                    .iter()
                    .map(|line| OrderLinePayload {
                        product: ProductPayload {
                            id: *line.product_id().as_uuid(),
                            code: None,
                            name: None,
                        },
                        quantity: line.quantity(),
                        price: line.price().minor_units(),
                    })
                    .collect(),
                total_price: draft.total_price().minor_units(),
                status: draft.status(),
            },
        })
    }

    async fn update_order(
        &self,
        request: UpdateOrderRequest,
    ) -> Result<UpdateOrderResponse, Error> {
        Err(Error::not_found(format!(
            "order {} not found",
            request.order_id
        )))
    }

    async fn assign_order(
        &self,
        request: AssignOrderRequest,
    ) -> Result<AssignOrderResponse, Error> {
        Err(Error::not_found(format!(
            "order {} not found",
            request.order_id
        )))
    }
}
