//! Port for order persistence.

use async_trait::async_trait;

use crate::domain::{Order, OrderDraft, OrderId, OrderListQuery, OrderPage};

use super::define_port_error;

define_port_error! {
    /// Errors raised by order repository adapters.
    pub enum OrderRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "order repository connection failed: {message}",
        /// Query failed, or stored rows did not form a valid order.
        Query { message: String } =>
            "order repository query failed: {message}",
        /// A write inside the creation transaction failed and was rolled back.
        Transaction { message: String } =>
            "order repository transaction failed: {message}",
        /// A save targeted an order row that does not exist.
        NotFound { order_id: String } =>
            "order {order_id} not found",
    }
}

/// Port for creating, reading and saving orders.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Insert the order and all of its lines atomically.
    ///
    /// The store assigns the id, code and timestamps. Either the order and
    /// every line become visible together or nothing does.
    async fn create(&self, draft: &OrderDraft) -> Result<Order, OrderRepositoryError>;

    /// Find an order with its lines and product projections.
    async fn find_by_id(&self, order_id: &OrderId) -> Result<Option<Order>, OrderRepositoryError>;

    /// Count the orders matching the filter and fetch the requested page.
    async fn list_for_user(&self, query: &OrderListQuery)
    -> Result<OrderPage, OrderRepositoryError>;

    /// Overwrite the mutable columns of an existing order.
    async fn save(&self, order: &Order) -> Result<Order, OrderRepositoryError>;
}

/// Fixture implementation for tests that do not exercise persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureOrderRepository;

#[async_trait]
impl OrderRepository for FixtureOrderRepository {
    async fn create(&self, _draft: &OrderDraft) -> Result<Order, OrderRepositoryError> {
        Err(OrderRepositoryError::connection(
            "fixture repository does not persist orders",
        ))
    }

    async fn find_by_id(&self, _order_id: &OrderId) -> Result<Option<Order>, OrderRepositoryError> {
        Ok(None)
    }

    async fn list_for_user(
        &self,
        _query: &OrderListQuery,
    ) -> Result<OrderPage, OrderRepositoryError> {
        Ok(OrderPage {
            orders: Vec::new(),
            total: 0,
        })
    }

    async fn save(&self, order: &Order) -> Result<Order, OrderRepositoryError> {
        Err(OrderRepositoryError::not_found(order.id().to_string()))
    }
}
