//! PostgreSQL-backed `OrderRepository` implementation using Diesel ORM.
//!
//! Orders and their lines are written in one transaction and read back with
//! lines and product projections resolved eagerly. Listing runs a filtered
//! count followed by a filtered, sorted and paged fetch.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{OrderRepository, OrderRepositoryError};
use crate::domain::{
    Money, Order, OrderCode, OrderDraft, OrderId, OrderLine, OrderLineRecord, OrderListFilter,
    OrderListQuery, OrderPage, OrderRecord, OrderSort, OrderSortField, OrderStatus, ProductId,
    ProductSummary, SortDirection, UserId,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{
    NewOrderLineRow, NewOrderRow, OrderChangeset, OrderLineRow, OrderRow, ProductRow,
};
use super::pool::{DbPool, PoolError};
use super::schema::{order_lines, orders, products};

/// Diesel-backed implementation of the order repository port.
#[derive(Clone)]
pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> OrderRepositoryError {
    map_basic_pool_error(error, OrderRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> OrderRepositoryError {
    map_basic_diesel_error(
        error,
        OrderRepositoryError::query,
        OrderRepositoryError::connection,
    )
}

/// Failures inside the creation transaction are reported as transaction
/// errors unless the connection itself went away.
fn map_transaction_error(error: diesel::result::Error) -> OrderRepositoryError {
    map_basic_diesel_error(
        error,
        OrderRepositoryError::transaction,
        OrderRepositoryError::connection,
    )
}

fn column_overflow(column: &str) -> OrderRepositoryError {
    OrderRepositoryError::query(format!("{column} does not fit its column"))
}

/// Line values computed before the transaction so that conversion failures
/// never reach the database.
struct PendingLine {
    position: i32,
    product_id: Uuid,
    quantity: i32,
    price: i64,
}

fn pending_lines(draft: &OrderDraft) -> Result<Vec<PendingLine>, OrderRepositoryError> {
    draft
        .lines()
        .iter()
        .enumerate()
        .map(|(position, line)| {
            Ok(PendingLine {
                position: i32::try_from(position).map_err(|_| column_overflow("position"))?,
                product_id: *line.product_id().as_uuid(),
                quantity: i32::try_from(line.quantity()).map_err(|_| column_overflow("quantity"))?,
                price: line.price().minor_units(),
            })
        })
        .collect()
}

fn row_to_line(
    row: OrderLineRow,
    product: ProductRow,
) -> Result<OrderLine, OrderRepositoryError> {
    let OrderLineRow {
        id,
        order_id,
        position,
        product_id,
        quantity,
        price,
    } = row;

    let position = u32::try_from(position)
        .map_err(|_| OrderRepositoryError::query(format!("negative position on line {id}")))?;
    let quantity = u32::try_from(quantity)
        .map_err(|_| OrderRepositoryError::query(format!("negative quantity on line {id}")))?;
    let price = Money::new(price).map_err(|err| OrderRepositoryError::query(err.to_string()))?;

    OrderLine::new(OrderLineRecord {
        id,
        order_id: OrderId::from_uuid(order_id),
        position,
        product_id: ProductId::from_uuid(product_id),
        product: Some(ProductSummary {
            id: ProductId::from_uuid(product.id),
            code: product.code,
            name: product.name,
        }),
        quantity,
        price,
    })
    .map_err(|err| OrderRepositoryError::query(err.to_string()))
}

/// Convert an order row and its lines into a validated domain order.
fn row_to_order(row: OrderRow, lines: Vec<OrderLine>) -> Result<Order, OrderRepositoryError> {
    let OrderRow {
        id,
        code,
        user_id,
        total_price,
        status,
        created_at,
        updated_at,
    } = row;

    let code = OrderCode::new(code).map_err(|err| OrderRepositoryError::query(err.to_string()))?;
    let status = status
        .parse::<OrderStatus>()
        .map_err(|err| OrderRepositoryError::query(err.to_string()))?;
    let total_price =
        Money::new(total_price).map_err(|err| OrderRepositoryError::query(err.to_string()))?;

    Order::new(OrderRecord {
        id: OrderId::from_uuid(id),
        code,
        user_id: UserId::from_uuid(user_id),
        total_price,
        status,
        lines,
        created_at,
        updated_at,
    })
    .map_err(|err| OrderRepositoryError::query(format!("order {id} is inconsistent: {err}")))
}

/// Load lines with their products for a set of orders, grouped by order id
/// and ordered by position.
async fn load_lines(
    conn: &mut AsyncPgConnection,
    order_ids: &[Uuid],
) -> Result<Vec<(OrderLineRow, ProductRow)>, diesel::result::Error> {
    order_lines::table
        .inner_join(products::table)
        .filter(order_lines::order_id.eq_any(order_ids))
        .order((order_lines::order_id.asc(), order_lines::position.asc()))
        .select((OrderLineRow::as_select(), ProductRow::as_select()))
        .load(conn)
        .await
}

fn assemble_orders(
    rows: Vec<OrderRow>,
    line_rows: Vec<(OrderLineRow, ProductRow)>,
) -> Result<Vec<Order>, OrderRepositoryError> {
    let mut lines_by_order: HashMap<Uuid, Vec<OrderLine>> = HashMap::new();
    for (line, product) in line_rows {
        let order_id = line.order_id;
        lines_by_order
            .entry(order_id)
            .or_default()
            .push(row_to_line(line, product)?);
    }

    rows.into_iter()
        .map(|row| {
            let lines = lines_by_order.remove(&row.id).unwrap_or_default();
            row_to_order(row, lines)
        })
        .collect()
}

fn filtered_orders(filter: &OrderListFilter) -> orders::BoxedQuery<'_, Pg> {
    let mut query = orders::table
        .filter(orders::user_id.eq(*filter.user_id.as_uuid()))
        .into_boxed();
    if let Some(code) = &filter.code {
        query = query.filter(orders::code.eq(code.as_str()));
    }
    if let Some(status) = filter.status {
        query = query.filter(orders::status.eq(status.as_str()));
    }
    query
}

/// Apply the resolved sort. Non-id fields fall back to id ascending for ties.
fn sorted<'a>(query: orders::BoxedQuery<'a, Pg>, sort: OrderSort) -> orders::BoxedQuery<'a, Pg> {
    use OrderSortField as Field;
    use SortDirection::{Asc, Desc};

    let query = match (sort.field, sort.direction) {
        (Field::Id, Asc) => return query.order(orders::id.asc()),
        (Field::Id, Desc) => return query.order(orders::id.desc()),
        (Field::Code, Asc) => query.order(orders::code.asc()),
        (Field::Code, Desc) => query.order(orders::code.desc()),
        (Field::Status, Asc) => query.order(orders::status.asc()),
        (Field::Status, Desc) => query.order(orders::status.desc()),
        (Field::TotalPrice, Asc) => query.order(orders::total_price.asc()),
        (Field::TotalPrice, Desc) => query.order(orders::total_price.desc()),
        (Field::CreatedAt, Asc) => query.order(orders::created_at.asc()),
        (Field::CreatedAt, Desc) => query.order(orders::created_at.desc()),
        (Field::UpdatedAt, Asc) => query.order(orders::updated_at.asc()),
        (Field::UpdatedAt, Desc) => query.order(orders::updated_at.desc()),
    };
    query.then_order_by(orders::id.asc())
}

#[async_trait]
impl OrderRepository for DieselOrderRepository {
    async fn create(&self, draft: &OrderDraft) -> Result<Order, OrderRepositoryError> {
        let lines = pending_lines(draft)?;
        let new_order = NewOrderRow {
            user_id: *draft.user_id().as_uuid(),
            total_price: draft.total_price().minor_units(),
            status: draft.status().as_str(),
        };
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let (order_row, line_rows) = conn
            .transaction(|conn| {
                async move {
                    let order_row = diesel::insert_into(orders::table)
                        .values(&new_order)
                        .returning(OrderRow::as_returning())
                        .get_result::<OrderRow>(conn)
                        .await?;

                    let new_lines: Vec<NewOrderLineRow> = lines
                        .iter()
                        .map(|line| NewOrderLineRow {
                            order_id: order_row.id,
                            position: line.position,
                            product_id: line.product_id,
                            quantity: line.quantity,
                            price: line.price,
                        })
                        .collect();
                    diesel::insert_into(order_lines::table)
                        .values(&new_lines)
                        .execute(conn)
                        .await?;

                    let line_rows = load_lines(conn, &[order_row.id]).await?;
                    Ok((order_row, line_rows))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_transaction_error)?;

        debug!(order_id = %order_row.id, lines = line_rows.len(), "order rows committed");
        let mut created = assemble_orders(vec![order_row], line_rows)?;
        created
            .pop()
            .ok_or_else(|| OrderRepositoryError::query("created order was not returned"))
    }

    async fn find_by_id(&self, order_id: &OrderId) -> Result<Option<Order>, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let Some(row) = orders::table
            .find(order_id.as_uuid())
            .select(OrderRow::as_select())
            .first::<OrderRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
        else {
            return Ok(None);
        };

        let line_rows = load_lines(&mut conn, &[row.id])
            .await
            .map_err(map_diesel_error)?;
        let mut found = assemble_orders(vec![row], line_rows)?;
        Ok(found.pop())
    }

    async fn list_for_user(
        &self,
        query: &OrderListQuery,
    ) -> Result<OrderPage, OrderRepositoryError> {
        let offset = i64::try_from(query.page.offset()).map_err(|_| column_overflow("offset"))?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let total: i64 = filtered_orders(&query.filter)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let rows: Vec<OrderRow> = sorted(filtered_orders(&query.filter), query.sort)
            .select(OrderRow::as_select())
            .limit(i64::from(query.page.limit()))
            .offset(offset)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let order_ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let line_rows = if order_ids.is_empty() {
            Vec::new()
        } else {
            load_lines(&mut conn, &order_ids)
                .await
                .map_err(map_diesel_error)?
        };

        Ok(OrderPage {
            orders: assemble_orders(rows, line_rows)?,
            total: u64::try_from(total).unwrap_or_default(),
        })
    }

    async fn save(&self, order: &Order) -> Result<Order, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changes = OrderChangeset {
            code: order.code().as_str(),
            status: order.status().as_str(),
        };

        let row = diesel::update(orders::table.find(order.id().as_uuid()))
            .set(&changes)
            .returning(OrderRow::as_returning())
            .get_result::<OrderRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .ok_or_else(|| OrderRepositoryError::not_found(order.id().to_string()))?;

        row_to_order(row, order.lines().to_vec())
    }
}
