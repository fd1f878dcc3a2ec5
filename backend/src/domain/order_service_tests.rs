//! Tests for the order services.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use mockall::predicate::always;
use rstest::{fixture, rstest};
use uuid::Uuid;

use super::*;
use crate::domain::ports::{CreateOrderLineRequest, MockOrderRepository};
use crate::domain::{
    ErrorCode, Money, OrderLine, OrderLineRecord, OrderPage, OrderRecord, ProductId,
    SortDirection, UserId,
};

fn stored_order(status: OrderStatus) -> Order {
    let id = OrderId::from_uuid(Uuid::new_v4());
    let now = Utc::now();
    let lines = [(10, 2), (5, 1)]
        .into_iter()
        .enumerate()
        .map(|(position, (price, quantity))| {
            OrderLine::new(OrderLineRecord {
                id: Uuid::new_v4(),
                order_id: id,
                position: u32::try_from(position).expect("small position"),
                product_id: ProductId::from_uuid(Uuid::new_v4()),
                product: None,
                quantity,
                price: Money::new(price).expect("valid amount"),
            })
            .expect("valid line")
        })
        .collect();
    Order::new(OrderRecord {
        id,
        code: OrderCode::new("ORD00000042").expect("valid code"),
        user_id: UserId::random(),
        total_price: Money::new(15).expect("valid amount"),
        status,
        lines,
        created_at: now,
        updated_at: now,
    })
    .expect("valid order")
}

#[fixture]
fn create_request() -> CreateOrderRequest {
    CreateOrderRequest {
        user_id: UserId::random(),
        lines: vec![
            CreateOrderLineRequest {
                product_id: Uuid::new_v4(),
                quantity: 2,
                price: 10,
            },
            CreateOrderLineRequest {
                product_id: Uuid::new_v4(),
                quantity: 1,
                price: 5,
            },
        ],
    }
}

#[rstest]
#[tokio::test]
async fn create_order_persists_draft_and_returns_payload(create_request: CreateOrderRequest) {
    let stored = stored_order(OrderStatus::Pending);
    let expected_id = *stored.id().as_uuid();

    let mut repo = MockOrderRepository::new();
    repo.expect_create()
        .withf(|draft: &OrderDraft| {
            draft.total_price() == Money::new(15).expect("valid amount")
                && draft.lines().len() == 2
                && draft.status() == OrderStatus::Pending
        })
        .times(1)
        .return_once(move |_| Ok(stored));

    let service = OrderCommandService::new(Arc::new(repo));
    let response = service
        .create_order(create_request)
        .await
        .expect("create succeeds");

    assert_eq!(response.order.id, expected_id);
    assert_eq!(response.order.total_price, 15);
    assert_eq!(response.order.lines.len(), 2);
    assert_eq!(response.order.status, OrderStatus::Pending);
}

#[rstest]
#[tokio::test]
async fn create_order_rejects_empty_lines_without_touching_store(
    mut create_request: CreateOrderRequest,
) {
    create_request.lines.clear();
    let mut repo = MockOrderRepository::new();
    repo.expect_create().times(0);

    let service = OrderCommandService::new(Arc::new(repo));
    let error = service
        .create_order(create_request)
        .await
        .expect_err("empty order rejected");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[case(OrderRepositoryError::connection("pool exhausted"), ErrorCode::ServiceUnavailable)]
#[case(OrderRepositoryError::transaction("fk violation"), ErrorCode::InternalError)]
#[case(OrderRepositoryError::query("syntax"), ErrorCode::InternalError)]
#[tokio::test]
async fn create_order_maps_repository_failures(
    create_request: CreateOrderRequest,
    #[case] failure: OrderRepositoryError,
    #[case] expected: ErrorCode,
) {
    let mut repo = MockOrderRepository::new();
    repo.expect_create()
        .times(1)
        .return_once(move |_| Err(failure));

    let service = OrderCommandService::new(Arc::new(repo));
    let error = service
        .create_order(create_request)
        .await
        .expect_err("repository failure surfaces");

    assert_eq!(error.code(), expected);
}

#[rstest]
#[tokio::test]
async fn assign_order_saves_in_progress_status() {
    let stored = stored_order(OrderStatus::Pending);
    let order_id = *stored.id().as_uuid();

    let mut repo = MockOrderRepository::new();
    repo.expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(stored)));
    repo.expect_save()
        .withf(|order: &Order| order.status() == OrderStatus::InProgress)
        .times(1)
        .returning(|order| Ok(order.clone()));

    let service = OrderCommandService::new(Arc::new(repo));
    let response = service
        .assign_order(AssignOrderRequest { order_id })
        .await
        .expect("assign succeeds");

    assert_eq!(response.status, OrderStatus::InProgress);
    assert!(response.changed);
}

#[rstest]
#[tokio::test]
async fn assign_order_twice_skips_the_write() {
    let stored = stored_order(OrderStatus::InProgress);
    let order_id = *stored.id().as_uuid();

    let mut repo = MockOrderRepository::new();
    repo.expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(stored)));
    repo.expect_save().times(0);

    let service = OrderCommandService::new(Arc::new(repo));
    let response = service
        .assign_order(AssignOrderRequest { order_id })
        .await
        .expect("re-assign is a no-op");

    assert_eq!(response.status, OrderStatus::InProgress);
    assert!(!response.changed);
}

#[rstest]
#[case(OrderStatus::Completed)]
#[case(OrderStatus::Cancelled)]
#[tokio::test]
async fn assign_order_rejects_terminal_orders(#[case] status: OrderStatus) {
    let stored = stored_order(status);
    let order_id = *stored.id().as_uuid();

    let mut repo = MockOrderRepository::new();
    repo.expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(stored)));
    repo.expect_save().times(0);

    let service = OrderCommandService::new(Arc::new(repo));
    let error = service
        .assign_order(AssignOrderRequest { order_id })
        .await
        .expect_err("terminal orders stay put");

    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn assign_order_reports_missing_order() {
    let mut repo = MockOrderRepository::new();
    repo.expect_find_by_id().times(1).return_once(|_| Ok(None));

    let service = OrderCommandService::new(Arc::new(repo));
    let error = service
        .assign_order(AssignOrderRequest {
            order_id: Uuid::new_v4(),
        })
        .await
        .expect_err("missing order");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn update_order_merges_code_and_keeps_status() {
    let stored = stored_order(OrderStatus::Pending);
    let order_id = *stored.id().as_uuid();

    let mut repo = MockOrderRepository::new();
    repo.expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(stored)));
    repo.expect_save()
        .withf(|order: &Order| {
            order.code().as_str() == "ORD-RUSH" && order.status() == OrderStatus::Pending
        })
        .times(1)
        .returning(|order| Ok(order.clone()));

    let service = OrderCommandService::new(Arc::new(repo));
    let response = service
        .update_order(UpdateOrderRequest {
            order_id,
            code: Some("ORD-RUSH".to_owned()),
            status: None,
        })
        .await
        .expect("update succeeds");

    assert_eq!(response.order.code, "ORD-RUSH");
    assert_eq!(response.order.status, OrderStatus::Pending);
    assert_eq!(response.order.total_price, 15);
}

#[rstest]
#[tokio::test]
async fn update_order_rejects_disallowed_transition() {
    let stored = stored_order(OrderStatus::Pending);
    let order_id = *stored.id().as_uuid();

    let mut repo = MockOrderRepository::new();
    repo.expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(stored)));
    repo.expect_save().times(0);

    let service = OrderCommandService::new(Arc::new(repo));
    let error = service
        .update_order(UpdateOrderRequest {
            order_id,
            code: Some("ORD-NEW".to_owned()),
            status: Some("completed".to_owned()),
        })
        .await
        .expect_err("pending cannot complete directly");

    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[rstest]
#[case(Some("shipped"), None)]
#[case(None, Some(""))]
#[tokio::test]
async fn update_order_rejects_malformed_fields(
    #[case] status: Option<&str>,
    #[case] code: Option<&str>,
) {
    let mut repo = MockOrderRepository::new();
    repo.expect_find_by_id().times(0);

    let service = OrderCommandService::new(Arc::new(repo));
    let error = service
        .update_order(UpdateOrderRequest {
            order_id: Uuid::new_v4(),
            code: code.map(str::to_owned),
            status: status.map(str::to_owned),
        })
        .await
        .expect_err("malformed payload");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn update_order_maps_vanished_row_to_not_found() {
    let stored = stored_order(OrderStatus::Pending);
    let order_id = *stored.id().as_uuid();

    let mut repo = MockOrderRepository::new();
    repo.expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(stored)));
    repo.expect_save()
        .times(1)
        .returning(|order| Err(OrderRepositoryError::not_found(order.id().to_string())));

    let service = OrderCommandService::new(Arc::new(repo));
    let error = service
        .update_order(UpdateOrderRequest {
            order_id,
            code: None,
            status: Some("in_progress".to_owned()),
        })
        .await
        .expect_err("row deleted concurrently");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn get_order_returns_payload() {
    let stored = stored_order(OrderStatus::Pending);
    let order_id = *stored.id().as_uuid();

    let mut repo = MockOrderRepository::new();
    repo.expect_find_by_id()
        .with(always())
        .times(1)
        .return_once(move |_| Ok(Some(stored)));

    let service = OrderQueryService::new(Arc::new(repo));
    let response = service
        .get_order(GetOrderRequest { order_id })
        .await
        .expect("get succeeds");

    assert_eq!(response.order.id, order_id);
    assert_eq!(response.order.lines.len(), 2);
}

#[rstest]
#[tokio::test]
async fn get_order_returns_not_found_when_missing() {
    let mut repo = MockOrderRepository::new();
    repo.expect_find_by_id().times(1).return_once(|_| Ok(None));

    let service = OrderQueryService::new(Arc::new(repo));
    let error = service
        .get_order(GetOrderRequest {
            order_id: Uuid::new_v4(),
        })
        .await
        .expect_err("not found");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn list_orders_resolves_filters_sort_and_paging() {
    let user_id = UserId::random();
    let expected_user = user_id.clone();
    let orders: Vec<Order> = (0..10)
        .map(|_| stored_order(OrderStatus::Pending))
        .collect();

    let mut repo = MockOrderRepository::new();
    repo.expect_list_for_user()
        .withf(move |query: &OrderListQuery| {
            query.filter.user_id == expected_user
                && query.filter.code.is_none()
                && query.filter.status == Some(OrderStatus::Pending)
                && query.sort.field == OrderSortField::CreatedAt
                && query.sort.direction == SortDirection::Desc
                && query.page.page() == 2
                && query.page.limit() == 10
        })
        .times(1)
        .return_once(move |_| Ok(OrderPage { orders, total: 25 }));

    let service = OrderQueryService::new(Arc::new(repo));
    let response = service
        .list_orders_for_user(ListOrdersRequest {
            user_id,
            code: Some(String::new()),
            status: Some("pending".to_owned()),
            order_by: Some("created_at".to_owned()),
            order_desc: true,
            page: 2,
            limit: 10,
        })
        .await
        .expect("list succeeds");

    assert_eq!(response.orders.len(), 10);
    assert_eq!(
        response.pagination,
        Pagination {
            current_page: 2,
            limit: 10,
            total: 25,
            total_pages: 3,
        }
    );
}

#[rstest]
#[tokio::test]
async fn list_orders_ignores_desc_without_sort_field() {
    let mut repo = MockOrderRepository::new();
    repo.expect_list_for_user()
        .withf(|query: &OrderListQuery| query.sort == OrderSort::default())
        .times(1)
        .return_once(|_| {
            Ok(OrderPage {
                orders: Vec::new(),
                total: 0,
            })
        });

    let mut request = ListOrdersRequest::for_user(UserId::random());
    request.order_desc = true;

    let service = OrderQueryService::new(Arc::new(repo));
    let response = service
        .list_orders_for_user(request)
        .await
        .expect("list succeeds");

    assert!(response.orders.is_empty());
    assert_eq!(response.pagination.total_pages, 0);
}

#[rstest]
#[tokio::test]
async fn list_orders_rejects_unknown_sort_field() {
    let mut repo = MockOrderRepository::new();
    repo.expect_list_for_user().times(0);

    let mut request = ListOrdersRequest::for_user(UserId::random());
    request.order_by = Some("user_id desc; --".to_owned());

    let service = OrderQueryService::new(Arc::new(repo));
    let error = service
        .list_orders_for_user(request)
        .await
        .expect_err("unknown column");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

/// Repository whose calls never finish before the deadline.
struct StalledOrderRepository;

#[async_trait]
impl OrderRepository for StalledOrderRepository {
    async fn create(&self, _draft: &OrderDraft) -> Result<Order, OrderRepositoryError> {
        tokio::time::sleep(Duration::from_secs(3_600)).await;
        Err(OrderRepositoryError::query("unreachable"))
    }

    async fn find_by_id(
        &self,
        _order_id: &OrderId,
    ) -> Result<Option<Order>, OrderRepositoryError> {
        tokio::time::sleep(Duration::from_secs(3_600)).await;
        Ok(None)
    }

    async fn list_for_user(
        &self,
        _query: &OrderListQuery,
    ) -> Result<OrderPage, OrderRepositoryError> {
        tokio::time::sleep(Duration::from_secs(3_600)).await;
        Ok(OrderPage {
            orders: Vec::new(),
            total: 0,
        })
    }

    async fn save(&self, order: &Order) -> Result<Order, OrderRepositoryError> {
        tokio::time::sleep(Duration::from_secs(3_600)).await;
        Ok(order.clone())
    }
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn create_order_times_out_when_store_stalls(create_request: CreateOrderRequest) {
    let service = OrderCommandService::new(Arc::new(StalledOrderRepository))
        .with_timeout(Duration::from_millis(250));

    let error = service
        .create_order(create_request)
        .await
        .expect_err("deadline elapses");

    assert_eq!(error.code(), ErrorCode::Timeout);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn get_order_times_out_when_store_stalls() {
    let service = OrderQueryService::new(Arc::new(StalledOrderRepository))
        .with_timeout(Duration::from_millis(250));

    let error = service
        .get_order(GetOrderRequest {
            order_id: Uuid::new_v4(),
        })
        .await
        .expect_err("deadline elapses");

    assert_eq!(error.code(), ErrorCode::Timeout);
}
