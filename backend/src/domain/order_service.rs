//! Order domain services.
//!
//! These services implement the order driving ports on top of an
//! [`OrderRepository`]. Every call runs under a per-call deadline; when it
//! elapses the in-flight repository future is dropped and a timeout error is
//! returned.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::domain::ports::{
    AssignOrderRequest, AssignOrderResponse, CreateOrderRequest, CreateOrderResponse,
    GetOrderRequest, GetOrderResponse, ListOrdersRequest, ListOrdersResponse, OrderCommand,
    OrderPayload, OrderQuery, OrderRepository, OrderRepositoryError, UpdateOrderRequest,
    UpdateOrderResponse,
};
use crate::domain::{
    Error, Order, OrderCode, OrderDraft, OrderId, OrderLifecycleError, OrderListFilter,
    OrderListQuery, OrderSort, OrderSortField, OrderStatus, OrderUpdate, PageRequest, Pagination,
};

/// Deadline applied when no explicit timeout is configured.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(5);

fn map_repository_error(error: OrderRepositoryError) -> Error {
    match error {
        OrderRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("order repository unavailable: {message}"))
        }
        OrderRepositoryError::Query { message } => {
            Error::internal(format!("order repository error: {message}"))
        }
        OrderRepositoryError::Transaction { message } => {
            Error::internal(format!("order transaction rolled back: {message}"))
        }
        OrderRepositoryError::NotFound { order_id } => {
            Error::not_found(format!("order {order_id} not found"))
        }
    }
}

fn map_lifecycle_error(order_id: OrderId, error: OrderLifecycleError) -> Error {
    warn!(%order_id, %error, "order status change rejected");
    Error::conflict(error.to_string())
}

async fn within_deadline<T, F>(
    operation: &'static str,
    timeout: Duration,
    work: F,
) -> Result<T, Error>
where
    F: Future<Output = Result<T, Error>>,
{
    match tokio::time::timeout(timeout, work).await {
        Ok(result) => result,
        Err(_) => {
            let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
            warn!(operation, timeout_ms, "order operation timed out");
            Err(Error::timeout(format!(
                "{operation} did not complete within {timeout_ms}ms"
            )))
        }
    }
}

/// Treat absent and empty strings alike.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|raw| !raw.is_empty())
}

fn parse_status(raw: &str) -> Result<OrderStatus, Error> {
    raw.parse::<OrderStatus>()
        .map_err(|err| Error::invalid_request(err.to_string()))
}

fn parse_code(raw: String) -> Result<OrderCode, Error> {
    OrderCode::new(raw).map_err(|err| Error::invalid_request(format!("invalid order code: {err}")))
}

async fn load_order<R>(repo: &R, order_id: OrderId) -> Result<Order, Error>
where
    R: OrderRepository + ?Sized,
{
    repo.find_by_id(&order_id)
        .await
        .map_err(map_repository_error)?
        .ok_or_else(|| Error::not_found(format!("order {order_id} not found")))
}

/// Order service implementing the command driving port.
#[derive(Clone)]
pub struct OrderCommandService<R> {
    order_repo: Arc<R>,
    timeout: Duration,
}

impl<R> OrderCommandService<R> {
    /// Create a command service using [`DEFAULT_CALL_TIMEOUT`].
    pub fn new(order_repo: Arc<R>) -> Self {
        Self {
            order_repo,
            timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    /// Override the per-call deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl<R> OrderCommandService<R>
where
    R: OrderRepository,
{
    async fn persist_if_changed(&self, order: Order, changed: bool) -> Result<Order, Error> {
        if !changed {
            debug!(order_id = %order.id(), "order unchanged; skipping save");
            return Ok(order);
        }
        self.order_repo
            .save(&order)
            .await
            .map_err(map_repository_error)
    }
}

#[async_trait]
impl<R> OrderCommand for OrderCommandService<R>
where
    R: OrderRepository,
{
    async fn create_order(
        &self,
        request: CreateOrderRequest,
    ) -> Result<CreateOrderResponse, Error> {
        let draft = OrderDraft::try_from(request)
            .map_err(|err| Error::invalid_request(format!("invalid order payload: {err}")))?;

        let order = within_deadline("create_order", self.timeout, async {
            self.order_repo
                .create(&draft)
                .await
                .map_err(map_repository_error)
        })
        .await?;

        info!(
            order_id = %order.id(),
            code = %order.code(),
            lines = order.lines().len(),
            total_price = %order.total_price(),
            "order created"
        );
        Ok(CreateOrderResponse {
            order: OrderPayload::from(order),
        })
    }

    async fn update_order(
        &self,
        request: UpdateOrderRequest,
    ) -> Result<UpdateOrderResponse, Error> {
        let order_id = OrderId::from_uuid(request.order_id);
        let update = OrderUpdate {
            code: request.code.map(parse_code).transpose()?,
            status: request.status.as_deref().map(parse_status).transpose()?,
        };

        let order = within_deadline("update_order", self.timeout, async {
            let mut order = load_order(self.order_repo.as_ref(), order_id).await?;
            let changed = order
                .apply_update(&update)
                .map_err(|err| map_lifecycle_error(order_id, err))?;
            self.persist_if_changed(order, changed).await
        })
        .await?;

        debug!(%order_id, status = %order.status(), "order updated");
        Ok(UpdateOrderResponse {
            order: OrderPayload::from(order),
        })
    }

    async fn assign_order(
        &self,
        request: AssignOrderRequest,
    ) -> Result<AssignOrderResponse, Error> {
        let order_id = OrderId::from_uuid(request.order_id);

        let (order, changed) = within_deadline("assign_order", self.timeout, async {
            let mut order = load_order(self.order_repo.as_ref(), order_id).await?;
            let transition = order
                .assign()
                .map_err(|err| map_lifecycle_error(order_id, err))?;
            let changed = transition.is_change();
            let order = self.persist_if_changed(order, changed).await?;
            Ok((order, changed))
        })
        .await?;

        info!(%order_id, changed, "order assigned");
        Ok(AssignOrderResponse {
            order_id: request.order_id,
            status: order.status(),
            changed,
        })
    }
}

/// Order service implementing the query driving port.
#[derive(Clone)]
pub struct OrderQueryService<R> {
    order_repo: Arc<R>,
    timeout: Duration,
}

impl<R> OrderQueryService<R> {
    /// Create a query service using [`DEFAULT_CALL_TIMEOUT`].
    pub fn new(order_repo: Arc<R>) -> Self {
        Self {
            order_repo,
            timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    /// Override the per-call deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

fn build_list_query(request: ListOrdersRequest) -> Result<OrderListQuery, Error> {
    let code = present(request.code).map(parse_code).transpose()?;
    let status = present(request.status)
        .as_deref()
        .map(parse_status)
        .transpose()?;
    let field = present(request.order_by)
        .map(|raw| raw.parse::<OrderSortField>())
        .transpose()
        .map_err(|err| Error::invalid_request(err.to_string()))?;

    Ok(OrderListQuery {
        filter: OrderListFilter {
            user_id: request.user_id,
            code,
            status,
        },
        sort: OrderSort::resolve(field, request.order_desc),
        page: PageRequest::new(request.page, request.limit),
    })
}

#[async_trait]
impl<R> OrderQuery for OrderQueryService<R>
where
    R: OrderRepository,
{
    async fn get_order(&self, request: GetOrderRequest) -> Result<GetOrderResponse, Error> {
        let order_id = OrderId::from_uuid(request.order_id);
        let order = within_deadline(
            "get_order",
            self.timeout,
            load_order(self.order_repo.as_ref(), order_id),
        )
        .await?;

        Ok(GetOrderResponse {
            order: OrderPayload::from(order),
        })
    }

    async fn list_orders_for_user(
        &self,
        request: ListOrdersRequest,
    ) -> Result<ListOrdersResponse, Error> {
        let query = build_list_query(request)?;

        let page = within_deadline("list_orders_for_user", self.timeout, async {
            self.order_repo
                .list_for_user(&query)
                .await
                .map_err(map_repository_error)
        })
        .await?;

        let pagination = Pagination::new(query.page, page.total);
        debug!(
            user_id = %query.filter.user_id,
            total = page.total,
            returned = page.orders.len(),
            "listed orders"
        );
        Ok(ListOrdersResponse {
            orders: page.orders.iter().map(OrderPayload::from).collect(),
            pagination,
        })
    }
}

#[cfg(test)]
#[path = "order_service_tests.rs"]
mod tests;
