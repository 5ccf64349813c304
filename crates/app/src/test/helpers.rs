//! Test Helpers

use jiff::Timestamp;
use sqlx::{PgPool, query_scalar};

use crate::domain::{
    identity::UserId,
    orders::data::{NewOrder, NewOrderItem},
    products::records::ProductId,
};

/// Insert a product directly, bypassing any service.
pub(crate) async fn seed_product(
    pool: &PgPool,
    price: i64,
    stock_quantity: i64,
) -> Result<ProductId, sqlx::Error> {
    let id: i64 = query_scalar(
        "INSERT INTO products (name, price, stock_quantity) VALUES ('test product', $1, $2) \
         RETURNING id",
    )
    .bind(price)
    .bind(stock_quantity)
    .fetch_one(pool)
    .await?;

    Ok(ProductId::from_i64(id))
}

/// Order for `user` from `(product, quantity, price)` lines, picked up at a fixed point.
pub(crate) fn new_order(user: UserId, lines: &[(ProductId, u64, u64)]) -> NewOrder {
    NewOrder {
        user_id: user,
        items: lines
            .iter()
            .map(|&(product_id, quantity, price)| NewOrderItem {
                product_id,
                quantity,
                price,
            })
            .collect(),
        pickup_point: "Main St. 1".to_string(),
        delivery_date: None,
    }
}

pub(crate) fn ts(value: &str) -> Result<Timestamp, jiff::Error> {
    value.parse()
}
