//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod order_command;
mod order_payload;
mod order_query;
mod order_repository;

#[cfg(test)]
pub use order_command::MockOrderCommand;
pub use order_command::{
    AssignOrderRequest, AssignOrderResponse, CreateOrderLineRequest, CreateOrderRequest,
    CreateOrderResponse, FixtureOrderCommand, OrderCommand, UpdateOrderRequest,
    UpdateOrderResponse,
};
pub use order_payload::{OrderLinePayload, OrderPayload, ProductPayload};
#[cfg(test)]
pub use order_query::MockOrderQuery;
pub use order_query::{
    FixtureOrderQuery, GetOrderRequest, GetOrderResponse, ListOrdersRequest, ListOrdersResponse,
    OrderQuery,
};
#[cfg(test)]
pub use order_repository::MockOrderRepository;
pub use order_repository::{FixtureOrderRepository, OrderRepository, OrderRepositoryError};
