//! Order Items Repository

use rustc_hash::FxHashMap;
use sqlx::{FromRow, PgConnection, Postgres, Row, postgres::PgRow, query, query_as};
use tracing::debug;

use crate::{
    columns::{to_db_amount, try_get_amount},
    domain::{
        orders::{
            data::NewOrderItem,
            records::{OrderId, OrderItemId, OrderItemRecord},
        },
        products::records::ProductId,
    },
};

const CREATE_ORDER_ITEMS_SQL: &str = include_str!("../sql/create_order_items.sql");
const LIST_ORDER_ITEMS_SQL: &str = include_str!("../sql/list_order_items.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrderItemsRepository;

impl PgOrderItemsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Write all items of `order` in one statement, preserving their input order.
    pub(crate) async fn create_items(
        &self,
        conn: &mut PgConnection,
        order: OrderId,
        items: &[NewOrderItem],
    ) -> Result<(), sqlx::Error> {
        let product_ids: Vec<i64> = items.iter().map(|item| item.product_id.into_i64()).collect();

        let quantities = items
            .iter()
            .map(|item| to_db_amount(item.quantity, "quantity"))
            .collect::<Result<Vec<i64>, _>>()?;

        let prices = items
            .iter()
            .map(|item| to_db_amount(item.price, "price"))
            .collect::<Result<Vec<i64>, _>>()?;

        let rows_affected = query(CREATE_ORDER_ITEMS_SQL)
            .bind(order.into_i64())
            .bind(&product_ids)
            .bind(&quantities)
            .bind(&prices)
            .execute(conn)
            .await?
            .rows_affected();

        debug!(order_id = %order, rows_affected, "created order items");

        Ok(())
    }

    /// Items for every order in `orders`, keyed by order.
    pub(crate) async fn list_items(
        &self,
        conn: &mut PgConnection,
        orders: &[OrderId],
    ) -> Result<FxHashMap<OrderId, Vec<OrderItemRecord>>, sqlx::Error> {
        if orders.is_empty() {
            return Ok(FxHashMap::default());
        }

        let order_ids: Vec<i64> = orders.iter().copied().map(OrderId::into_i64).collect();

        let rows = query_as::<Postgres, OrderItemRecord>(LIST_ORDER_ITEMS_SQL)
            .bind(&order_ids)
            .fetch_all(conn)
            .await?;

        let mut grouped: FxHashMap<OrderId, Vec<OrderItemRecord>> = FxHashMap::default();

        for item in rows {
            grouped.entry(item.order_id).or_default().push(item);
        }

        Ok(grouped)
    }
}

impl<'r> FromRow<'r, PgRow> for OrderItemRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: OrderItemId::from_i64(row.try_get("id")?),
            order_id: OrderId::from_i64(row.try_get("order_id")?),
            product_id: ProductId::from_i64(row.try_get("product_id")?),
            quantity: try_get_amount(row, "quantity")?,
            price: try_get_amount(row, "price")?,
            total_price: try_get_amount(row, "total_price")?,
        })
    }
}
