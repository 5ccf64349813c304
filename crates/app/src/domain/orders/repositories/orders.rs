//! Orders Repository

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, PgConnection, Postgres, Row, postgres::PgRow, query, query_as, query_scalar};

use crate::{
    columns::{to_db_amount, try_get_amount},
    domain::{
        identity::UserId,
        orders::{
            data::{ExportFilter, NewOrder},
            records::{OrderId, OrderRecord, StatusCount},
            status::OrderStatus,
        },
    },
};

const CREATE_ORDER_SQL: &str = include_str!("../sql/create_order.sql");
const GET_ORDER_SQL: &str = include_str!("../sql/get_order.sql");
const LIST_USER_ORDERS_SQL: &str = include_str!("../sql/list_user_orders.sql");
const EXPORT_ORDERS_SQL: &str = include_str!("../sql/export_orders.sql");
const UPDATE_ORDER_STATUS_SQL: &str = include_str!("../sql/update_order_status.sql");
const TRANSITION_ORDER_STATUS_SQL: &str = include_str!("../sql/transition_order_status.sql");
const DELETE_ORDER_SQL: &str = include_str!("../sql/delete_order.sql");
const COUNT_ORDERS_BY_STATUS_SQL: &str = include_str!("../sql/count_orders_by_status.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrdersRepository;

impl PgOrdersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Insert the order row in `pending_payment`. Items are written separately.
    pub(crate) async fn create_order(
        &self,
        conn: &mut PgConnection,
        order: &NewOrder,
        total_amount: u64,
    ) -> Result<OrderId, sqlx::Error> {
        let id: i64 = query_scalar(CREATE_ORDER_SQL)
            .bind(order.user_id.into_i64())
            .bind(OrderStatus::PendingPayment.as_str())
            .bind(order.delivery_date.map(SqlxTimestamp::from))
            .bind(order.pickup_point.as_str())
            .bind(to_db_amount(total_amount, "total_amount")?)
            .fetch_one(conn)
            .await?;

        Ok(OrderId::from_i64(id))
    }

    pub(crate) async fn get_order(
        &self,
        conn: &mut PgConnection,
        order: OrderId,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(GET_ORDER_SQL)
            .bind(order.into_i64())
            .fetch_one(conn)
            .await
    }

    /// Orders owned by `user`, most recent first.
    pub(crate) async fn list_user_orders(
        &self,
        conn: &mut PgConnection,
        user: UserId,
    ) -> Result<Vec<OrderRecord>, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(LIST_USER_ORDERS_SQL)
            .bind(user.into_i64())
            .fetch_all(conn)
            .await
    }

    pub(crate) async fn export_orders(
        &self,
        conn: &mut PgConnection,
        filter: &ExportFilter,
    ) -> Result<Vec<OrderRecord>, sqlx::Error> {
        let page = filter.page();

        query_as::<Postgres, OrderRecord>(EXPORT_ORDERS_SQL)
            .bind(filter.user_id.map(UserId::into_i64))
            .bind(filter.status.map(OrderStatus::as_str))
            .bind(filter.min_amount.map(saturating_db_amount))
            .bind(filter.max_amount.map(saturating_db_amount))
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(conn)
            .await
    }

    /// Unconditionally assign `status`. Returns the number of rows touched.
    pub(crate) async fn update_status(
        &self,
        conn: &mut PgConnection,
        order: OrderId,
        status: OrderStatus,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(UPDATE_ORDER_STATUS_SQL)
            .bind(order.into_i64())
            .bind(status.as_str())
            .execute(conn)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    /// Move from `from` to `to` only if the order is still in `from`.
    pub(crate) async fn transition_status(
        &self,
        conn: &mut PgConnection,
        order: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(TRANSITION_ORDER_STATUS_SQL)
            .bind(order.into_i64())
            .bind(from.as_str())
            .bind(to.as_str())
            .execute(conn)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    /// Hard delete; items go with the order through `ON DELETE CASCADE`.
    pub(crate) async fn delete_order(
        &self,
        conn: &mut PgConnection,
        order: OrderId,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_ORDER_SQL)
            .bind(order.into_i64())
            .execute(conn)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    /// Orders per status with `order_date` inside `[from, to]`.
    pub(crate) async fn count_by_status(
        &self,
        conn: &mut PgConnection,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<StatusCount>, sqlx::Error> {
        query_as::<Postgres, StatusCount>(COUNT_ORDERS_BY_STATUS_SQL)
            .bind(SqlxTimestamp::from(from))
            .bind(SqlxTimestamp::from(to))
            .fetch_all(conn)
            .await
    }
}

/// Amount filters beyond the column range cannot match anything smaller, so clamp them.
fn saturating_db_amount(amount: u64) -> i64 {
    i64::try_from(amount).unwrap_or(i64::MAX)
}

fn try_get_status(row: &PgRow) -> Result<OrderStatus, sqlx::Error> {
    let status: String = row.try_get("status")?;

    status.parse().map_err(|e| sqlx::Error::ColumnDecode {
        index: "status".to_string(),
        source: Box::new(e),
    })
}

impl<'r> FromRow<'r, PgRow> for OrderRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: OrderId::from_i64(row.try_get("id")?),
            user_id: UserId::from_i64(row.try_get("user_id")?),
            status: try_get_status(row)?,
            delivery_date: row
                .try_get::<Option<SqlxTimestamp>, _>("delivery_date")?
                .map(SqlxTimestamp::to_jiff),
            pickup_point: row.try_get("pickup_point")?,
            order_date: row.try_get::<SqlxTimestamp, _>("order_date")?.to_jiff(),
            total_amount: try_get_amount(row, "total_amount")?,
            receipt_url: row.try_get("receipt_url")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
            items: Vec::new(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for StatusCount {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            status: try_get_status(row)?,
            count: try_get_amount(row, "count")?,
        })
    }
}
