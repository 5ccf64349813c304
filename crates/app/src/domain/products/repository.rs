//! Products Repository

use sqlx::{FromRow, PgConnection, Postgres, Row, postgres::PgRow, query, query_as};

use crate::{
    columns::{to_db_amount, try_get_amount},
    domain::products::records::{ProductId, ProductStock},
};

const GET_PRODUCT_STOCK_SQL: &str = include_str!("sql/get_product_stock.sql");
const RESERVE_STOCK_SQL: &str = include_str!("sql/reserve_stock.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgProductsRepository;

impl PgProductsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Read price and stock, locking the row until the surrounding transaction ends.
    #[tracing::instrument(
        name = "products.repository.get_product_stock",
        skip(self, conn),
        fields(product_id = %product),
        err
    )]
    pub(crate) async fn get_product_stock(
        &self,
        conn: &mut PgConnection,
        product: ProductId,
    ) -> Result<Option<ProductStock>, sqlx::Error> {
        query_as::<Postgres, ProductStock>(GET_PRODUCT_STOCK_SQL)
            .bind(product.into_i64())
            .fetch_optional(conn)
            .await
    }

    /// Take `quantity` units out of stock. Returns `false` when stock is insufficient.
    #[tracing::instrument(
        name = "products.repository.reserve_stock",
        skip(self, conn),
        fields(product_id = %product),
        err
    )]
    pub(crate) async fn reserve_stock(
        &self,
        conn: &mut PgConnection,
        product: ProductId,
        quantity: u64,
    ) -> Result<bool, sqlx::Error> {
        let rows_affected = query(RESERVE_STOCK_SQL)
            .bind(product.into_i64())
            .bind(to_db_amount(quantity, "stock_quantity")?)
            .execute(conn)
            .await?
            .rows_affected();

        Ok(rows_affected == 1)
    }
}

impl<'r> FromRow<'r, PgRow> for ProductStock {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: ProductId::from_i64(row.try_get("id")?),
            price: try_get_amount(row, "price")?,
            stock_quantity: try_get_amount(row, "stock_quantity")?,
        })
    }
}
