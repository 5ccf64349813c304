//! Orders service.

use async_trait::async_trait;
use jiff::Zoned;
use mockall::automock;
use sqlx::PgConnection;
use tracing::{Span, info, warn};

use crate::{
    database::Db,
    domain::{
        identity::{Caller, UserId},
        orders::{
            access::OrderAccess,
            data::{ExportFilter, NewOrder, StatsRange},
            errors::OrdersServiceError,
            records::{OrderId, OrderRecord, StatusCount},
            repositories::{PgOrderItemsRepository, PgOrdersRepository},
            status::OrderStatus,
        },
        products::PgProductsRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgOrdersService {
    db: Db,
    orders: PgOrdersRepository,
    items: PgOrderItemsRepository,
    products: PgProductsRepository,
}

impl PgOrdersService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            orders: PgOrdersRepository::new(),
            items: PgOrderItemsRepository::new(),
            products: PgProductsRepository::new(),
        }
    }

    /// Reserve stock for every product, then write the order and its items. Runs inside the
    /// caller's unit of work; nothing is visible until it commits.
    async fn place_order(
        &self,
        conn: &mut PgConnection,
        order: &NewOrder,
        total_amount: u64,
    ) -> Result<OrderId, OrdersServiceError> {
        // Stock rows are locked in ascending product id order so concurrent creations
        // naming the same products cannot deadlock.
        for (product_id, requested) in order.quantities_by_product()? {
            let stock = self
                .products
                .get_product_stock(&mut *conn, product_id)
                .await?
                .ok_or_else(|| {
                    OrdersServiceError::invalid_input(format!(
                        "product {product_id} does not exist"
                    ))
                })?;

            let insufficient = OrdersServiceError::InsufficientStock {
                product: product_id,
                requested,
                available: stock.stock_quantity,
            };

            if stock.stock_quantity < requested {
                return Err(insufficient);
            }

            if !self
                .products
                .reserve_stock(&mut *conn, product_id, requested)
                .await?
            {
                return Err(insufficient);
            }
        }

        let order_id = self
            .orders
            .create_order(&mut *conn, order, total_amount)
            .await?;

        self.items
            .create_items(&mut *conn, order_id, &order.items)
            .await?;

        Ok(order_id)
    }

    async fn with_items(
        &self,
        conn: &mut PgConnection,
        mut orders: Vec<OrderRecord>,
    ) -> Result<Vec<OrderRecord>, OrdersServiceError> {
        let ids: Vec<OrderId> = orders.iter().map(|order| order.id).collect();

        let mut items = self.items.list_items(conn, &ids).await?;

        for order in &mut orders {
            order.items = items.remove(&order.id).unwrap_or_default();
        }

        Ok(orders)
    }
}

#[async_trait]
impl OrdersService for PgOrdersService {
    #[tracing::instrument(
        name = "orders.service.create_order",
        skip(self, order),
        fields(
            user_id = %order.user_id,
            item_count = order.items.len(),
            order_id = tracing::field::Empty
        ),
        err
    )]
    async fn create_order(&self, order: NewOrder) -> Result<OrderId, OrdersServiceError> {
        let total_amount = order.total_amount()?;

        let mut uow = self.db.begin().await?;

        let order_id = match self
            .place_order(uow.connection(), &order, total_amount)
            .await
        {
            Ok(order_id) => order_id,
            Err(error) => {
                if let Err(rollback_error) = uow.rollback().await {
                    warn!(error = %rollback_error, "failed to roll back order creation");
                }

                return Err(error.into_creation_error());
            }
        };

        uow.commit()
            .await
            .map_err(|error| OrdersServiceError::from(error).into_creation_error())?;

        Span::current().record("order_id", tracing::field::display(order_id));

        info!(order_id = %order_id, total_amount, "created order");

        Ok(order_id)
    }

    #[tracing::instrument(
        name = "orders.service.get_order_by_id",
        skip(self, caller),
        fields(order_id = %order, caller_id = %caller.user, caller_role = %caller.role),
        err
    )]
    async fn get_order_by_id(
        &self,
        order: OrderId,
        caller: Caller,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut conn = self.db.acquire().await?;

        let mut record = self.orders.get_order(&mut conn, order).await?;

        if !OrderAccess::resolve(record.user_id, &caller).can_view() {
            return Err(OrdersServiceError::NotFound);
        }

        let mut items = self.items.list_items(&mut conn, &[order]).await?;

        record.items = items.remove(&order).unwrap_or_default();

        Ok(record)
    }

    #[tracing::instrument(
        name = "orders.service.get_user_orders",
        skip(self),
        fields(user_id = %user),
        err
    )]
    async fn get_user_orders(&self, user: UserId) -> Result<Vec<OrderRecord>, OrdersServiceError> {
        let mut conn = self.db.acquire().await?;

        let orders = self.orders.list_user_orders(&mut conn, user).await?;

        self.with_items(&mut conn, orders).await
    }

    #[tracing::instrument(
        name = "orders.service.cancel_order",
        skip(self, caller),
        fields(order_id = %order, caller_id = %caller.user, caller_role = %caller.role),
        err
    )]
    async fn cancel_order(&self, order: OrderId, caller: Caller) -> Result<(), OrdersServiceError> {
        let mut conn = self.db.acquire().await?;

        let record = self.orders.get_order(&mut conn, order).await?;

        if !OrderAccess::resolve(record.user_id, &caller).can_cancel() {
            return Err(OrdersServiceError::NotFound);
        }

        if !record.status.is_cancellable() {
            return Err(OrdersServiceError::invalid_input(format!(
                "cannot cancel an order that is {}",
                record.status
            )));
        }

        // The status may have moved since the read above.
        let rows_affected = self
            .orders
            .transition_status(
                &mut conn,
                order,
                OrderStatus::PendingPayment,
                OrderStatus::Cancelled,
            )
            .await?;

        if rows_affected == 0 {
            return Err(OrdersServiceError::invalid_input(
                "order is no longer pending payment",
            ));
        }

        info!(order_id = %order, "cancelled order");

        Ok(())
    }

    #[tracing::instrument(
        name = "orders.service.admin_update_status",
        skip(self, caller),
        fields(order_id = %order, caller_id = %caller.user, caller_role = %caller.role),
        err
    )]
    async fn admin_update_status(
        &self,
        order: OrderId,
        status: String,
        caller: Caller,
    ) -> Result<(), OrdersServiceError> {
        if !caller.is_admin() {
            return Err(OrdersServiceError::Forbidden);
        }

        let status = status.parse::<OrderStatus>()?;

        let mut conn = self.db.acquire().await?;

        let rows_affected = self.orders.update_status(&mut conn, order, status).await?;

        if rows_affected == 0 {
            return Err(OrdersServiceError::NotFound);
        }

        info!(order_id = %order, status = %status, "updated order status");

        Ok(())
    }

    #[tracing::instrument(
        name = "orders.service.delete_order",
        skip(self, caller),
        fields(order_id = %order, caller_id = %caller.user, caller_role = %caller.role),
        err
    )]
    async fn delete_order(&self, order: OrderId, caller: Caller) -> Result<(), OrdersServiceError> {
        if !caller.is_admin() {
            return Err(OrdersServiceError::Forbidden);
        }

        let mut conn = self.db.acquire().await?;

        let rows_affected = self.orders.delete_order(&mut conn, order).await?;

        if rows_affected == 0 {
            return Err(OrdersServiceError::NotFound);
        }

        info!(order_id = %order, "deleted order");

        Ok(())
    }

    #[tracing::instrument(name = "orders.service.get_stats", skip(self), err)]
    async fn get_stats(&self, range: StatsRange) -> Result<Vec<StatusCount>, OrdersServiceError> {
        let (from, to) = range.resolve(&Zoned::now())?;

        let mut conn = self.db.acquire().await?;

        Ok(self.orders.count_by_status(&mut conn, from, to).await?)
    }

    #[tracing::instrument(name = "orders.service.export_orders", skip(self), err)]
    async fn export_orders(
        &self,
        filter: ExportFilter,
    ) -> Result<Vec<OrderRecord>, OrdersServiceError> {
        let mut conn = self.db.acquire().await?;

        let orders = self.orders.export_orders(&mut conn, &filter).await?;

        self.with_items(&mut conn, orders).await
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Atomically reserve stock and create a `pending_payment` order with its items.
    async fn create_order(&self, order: NewOrder) -> Result<OrderId, OrdersServiceError>;

    /// Retrieve a single order with its items, if the caller may see it.
    async fn get_order_by_id(
        &self,
        order: OrderId,
        caller: Caller,
    ) -> Result<OrderRecord, OrdersServiceError>;

    /// All orders owned by `user`, most recent first.
    async fn get_user_orders(&self, user: UserId) -> Result<Vec<OrderRecord>, OrdersServiceError>;

    /// Cancel an order that is still awaiting payment.
    async fn cancel_order(&self, order: OrderId, caller: Caller) -> Result<(), OrdersServiceError>;

    /// Assign any status to an order. Admin only.
    async fn admin_update_status(
        &self,
        order: OrderId,
        status: String,
        caller: Caller,
    ) -> Result<(), OrdersServiceError>;

    /// Hard delete an order and its items. Admin only.
    async fn delete_order(&self, order: OrderId, caller: Caller) -> Result<(), OrdersServiceError>;

    /// Order counts per status within the range.
    async fn get_stats(&self, range: StatsRange) -> Result<Vec<StatusCount>, OrdersServiceError>;

    /// One page of orders matching `filter`, most recent first.
    async fn export_orders(
        &self,
        filter: ExportFilter,
    ) -> Result<Vec<OrderRecord>, OrdersServiceError>;
}

#[cfg(test)]
mod tests {
    use jiff::{Timestamp, ToSpan};
    use testresult::TestResult;
    use tokio::task::JoinSet;

    use crate::{
        domain::{identity::Role, orders::data::NewOrderItem, products::records::ProductId},
        test::{
            TestContext,
            helpers::{new_order, ts},
        },
    };

    use super::*;

    const ALICE: UserId = UserId::from_i64(1);
    const BOB: UserId = UserId::from_i64(2);
    const ADMIN: UserId = UserId::from_i64(99);

    #[tokio::test]
    async fn create_order_totals_supplied_prices() -> TestResult {
        let ctx = TestContext::new().await;
        let p1 = ctx.create_product(500, 10).await?;
        let p2 = ctx.create_product(300, 10).await?;

        let id = ctx
            .orders
            .create_order(new_order(ALICE, &[(p1, 2, 500), (p2, 1, 300)]))
            .await?;

        let order = ctx.orders.get_order_by_id(id, Caller::user(ALICE)).await?;

        assert_eq!(order.total_amount, 1300);
        assert_eq!(order.status, OrderStatus::PendingPayment);
        assert_eq!(order.user_id, ALICE);
        assert_eq!(
            order
                .items
                .iter()
                .map(|item| (item.product_id, item.total_price))
                .collect::<Vec<_>>(),
            vec![(p1, 1000), (p2, 300)]
        );

        Ok(())
    }

    #[tokio::test]
    async fn create_order_decrements_stock() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.create_product(500, 10).await?;

        ctx.orders
            .create_order(new_order(ALICE, &[(product, 3, 500)]))
            .await?;

        assert_eq!(ctx.product_stock(product).await?, 7);

        Ok(())
    }

    #[tokio::test]
    async fn insufficient_stock_rejects_whole_order() -> TestResult {
        let ctx = TestContext::new().await;
        let plenty = ctx.create_product(100, 10).await?;
        let scarce = ctx.create_product(500, 1).await?;

        let result = ctx
            .orders
            .create_order(new_order(ALICE, &[(plenty, 2, 100), (scarce, 2, 500)]))
            .await;

        assert!(
            matches!(
                result,
                Err(OrdersServiceError::InsufficientStock {
                    product,
                    requested: 2,
                    available: 1,
                }) if product == scarce
            ),
            "expected InsufficientStock, got {result:?}"
        );
        assert_eq!(ctx.count_orders().await?, 0);
        assert_eq!(ctx.count_order_items().await?, 0);
        assert_eq!(ctx.product_stock(plenty).await?, 10);
        assert_eq!(ctx.product_stock(scarce).await?, 1);

        Ok(())
    }

    #[tokio::test]
    async fn repeated_product_lines_share_one_stock_pool() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.create_product(100, 3).await?;

        let result = ctx
            .orders
            .create_order(new_order(ALICE, &[(product, 2, 100), (product, 2, 100)]))
            .await;

        assert!(
            matches!(
                result,
                Err(OrdersServiceError::InsufficientStock {
                    requested: 4,
                    available: 3,
                    ..
                })
            ),
            "expected InsufficientStock, got {result:?}"
        );
        assert_eq!(ctx.product_stock(product).await?, 3);

        Ok(())
    }

    #[tokio::test]
    async fn repeated_product_lines_reserve_their_sum() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.create_product(100, 5).await?;

        ctx.orders
            .create_order(new_order(ALICE, &[(product, 2, 100), (product, 2, 100)]))
            .await?;

        assert_eq!(ctx.product_stock(product).await?, 1);
        assert_eq!(ctx.count_order_items().await?, 2);

        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_orders_never_oversell() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.create_product(100, 3).await?;

        let mut tasks = JoinSet::new();

        for user in 1..=8 {
            let orders = ctx.orders.clone();

            tasks.spawn(async move {
                orders
                    .create_order(new_order(UserId::from_i64(user), &[(product, 1, 100)]))
                    .await
            });
        }

        let mut results = Vec::new();

        while let Some(joined) = tasks.join_next().await {
            results.push(joined?);
        }

        let created = results.iter().filter(|result| result.is_ok()).count();
        let refused = results
            .iter()
            .filter(|result| matches!(result, Err(OrdersServiceError::InsufficientStock { .. })))
            .count();

        assert_eq!(created, 3, "expected 3 orders to succeed, got {results:?}");
        assert_eq!(refused, 5, "expected 5 stock refusals, got {results:?}");
        assert_eq!(ctx.product_stock(product).await?, 0);
        assert_eq!(ctx.count_orders().await?, 3);
        assert_eq!(ctx.count_order_items().await?, 3);

        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn orders_naming_products_in_opposite_order_both_succeed() -> TestResult {
        const ROUNDS: i64 = 25;

        let ctx = TestContext::new().await;
        let a = ctx.create_product(100, 1_000).await?;
        let b = ctx.create_product(200, 1_000).await?;

        for _ in 0..ROUNDS {
            let forward = ctx.orders.clone();
            let backward = ctx.orders.clone();

            let (first, second) = tokio::join!(
                tokio::spawn(async move {
                    forward
                        .create_order(new_order(ALICE, &[(a, 1, 100), (b, 1, 200)]))
                        .await
                }),
                tokio::spawn(async move {
                    backward
                        .create_order(new_order(BOB, &[(b, 1, 200), (a, 1, 100)]))
                        .await
                }),
            );

            let (first, second) = (first?, second?);

            assert!(
                first.is_ok() && second.is_ok(),
                "expected both orders to succeed, got {first:?} and {second:?}"
            );
        }

        assert_eq!(ctx.product_stock(a).await?, 1_000 - 2 * ROUNDS);
        assert_eq!(ctx.product_stock(b).await?, 1_000 - 2 * ROUNDS);
        assert_eq!(ctx.count_orders().await?, 2 * ROUNDS);

        Ok(())
    }

    #[tokio::test]
    async fn unknown_product_leaves_no_partial_order() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.create_product(100, 5).await?;

        let result = ctx
            .orders
            .create_order(new_order(
                ALICE,
                &[(product, 1, 100), (ProductId::from_i64(404), 1, 100)],
            ))
            .await;

        assert!(
            matches!(result, Err(OrdersServiceError::InvalidInput(_))),
            "expected InvalidInput, got {result:?}"
        );
        assert_eq!(ctx.count_orders().await?, 0);
        assert_eq!(ctx.count_order_items().await?, 0);
        assert_eq!(ctx.product_stock(product).await?, 5);

        Ok(())
    }

    #[tokio::test]
    async fn create_order_rejects_empty_and_zero_quantity_requests() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.create_product(100, 5).await?;

        let empty = ctx.orders.create_order(new_order(ALICE, &[])).await;
        let zero = ctx
            .orders
            .create_order(new_order(ALICE, &[(product, 0, 100)]))
            .await;

        assert!(
            matches!(empty, Err(OrdersServiceError::InvalidInput(_))),
            "expected InvalidInput, got {empty:?}"
        );
        assert!(
            matches!(zero, Err(OrdersServiceError::InvalidInput(_))),
            "expected InvalidInput, got {zero:?}"
        );
        assert_eq!(ctx.count_orders().await?, 0);

        Ok(())
    }

    #[tokio::test]
    async fn create_order_keeps_delivery_date_and_pickup_point() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.create_product(100, 5).await?;
        let delivery = ts("2026-11-02T09:00:00Z")?;

        let id = ctx
            .orders
            .create_order(NewOrder {
                user_id: ALICE,
                items: vec![NewOrderItem {
                    product_id: product,
                    quantity: 1,
                    price: 100,
                }],
                pickup_point: "Locker 7".to_string(),
                delivery_date: Some(delivery),
            })
            .await?;

        let order = ctx.orders.get_order_by_id(id, Caller::user(ALICE)).await?;

        assert_eq!(order.pickup_point, "Locker 7");
        assert_eq!(order.delivery_date, Some(delivery));
        assert!(order.receipt_url.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn get_order_hides_other_users_orders() -> TestResult {
        let ctx = TestContext::new().await;
        let id = ctx.place_order(ALICE).await?;

        let result = ctx.orders.get_order_by_id(id, Caller::user(BOB)).await;

        assert!(
            matches!(result, Err(OrdersServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        let as_admin = ctx.orders.get_order_by_id(id, Caller::admin(ADMIN)).await?;

        assert_eq!(as_admin.id, id);
        assert_eq!(as_admin.items.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn get_order_unknown_id_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx
            .orders
            .get_order_by_id(OrderId::from_i64(404), Caller::admin(ADMIN))
            .await;

        assert!(
            matches!(result, Err(OrdersServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn get_user_orders_returns_only_own_orders_newest_first() -> TestResult {
        let ctx = TestContext::new().await;
        let older = ctx.place_order(ALICE).await?;
        let newer = ctx.place_order(ALICE).await?;
        ctx.place_order(BOB).await?;

        ctx.set_order_date(older, ts("2026-01-01T00:00:00Z")?).await?;
        ctx.set_order_date(newer, ts("2026-02-01T00:00:00Z")?).await?;

        let orders = ctx.orders.get_user_orders(ALICE).await?;

        assert_eq!(
            orders.iter().map(|order| order.id).collect::<Vec<_>>(),
            vec![newer, older]
        );
        assert!(
            orders.iter().all(|order| order.items.len() == 1),
            "expected items attached to every order, got {orders:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn get_user_orders_without_orders_is_empty() -> TestResult {
        let ctx = TestContext::new().await;

        assert!(ctx.orders.get_user_orders(BOB).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn owner_can_cancel_only_once() -> TestResult {
        let ctx = TestContext::new().await;
        let id = ctx.place_order(ALICE).await?;

        ctx.orders.cancel_order(id, Caller::user(ALICE)).await?;

        let order = ctx.orders.get_order_by_id(id, Caller::user(ALICE)).await?;

        assert_eq!(order.status, OrderStatus::Cancelled);

        let again = ctx.orders.cancel_order(id, Caller::user(ALICE)).await;

        assert!(
            matches!(again, Err(OrdersServiceError::InvalidInput(_))),
            "expected InvalidInput, got {again:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn cancel_by_stranger_returns_not_found_and_keeps_status() -> TestResult {
        let ctx = TestContext::new().await;
        let id = ctx.place_order(ALICE).await?;

        let result = ctx.orders.cancel_order(id, Caller::user(BOB)).await;

        assert!(
            matches!(result, Err(OrdersServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        let order = ctx.orders.get_order_by_id(id, Caller::user(ALICE)).await?;

        assert_eq!(order.status, OrderStatus::PendingPayment);

        Ok(())
    }

    #[tokio::test]
    async fn cancel_after_payment_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;
        let id = ctx.place_order(ALICE).await?;

        ctx.orders
            .admin_update_status(id, "paid".to_string(), Caller::admin(ADMIN))
            .await?;

        let result = ctx.orders.cancel_order(id, Caller::user(ALICE)).await;

        assert!(
            matches!(result, Err(OrdersServiceError::InvalidInput(_))),
            "expected InvalidInput, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn admin_can_cancel_pending_order() -> TestResult {
        let ctx = TestContext::new().await;
        let id = ctx.place_order(ALICE).await?;

        ctx.orders.cancel_order(id, Caller::admin(ADMIN)).await?;

        let order = ctx.orders.get_order_by_id(id, Caller::user(ALICE)).await?;

        assert_eq!(order.status, OrderStatus::Cancelled);

        Ok(())
    }

    #[tokio::test]
    async fn cancel_unknown_order_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx
            .orders
            .cancel_order(OrderId::from_i64(404), Caller::user(ALICE))
            .await;

        assert!(
            matches!(result, Err(OrdersServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn admin_can_assign_every_status() -> TestResult {
        let ctx = TestContext::new().await;
        let id = ctx.place_order(ALICE).await?;

        for status in OrderStatus::ALL {
            ctx.orders
                .admin_update_status(id, status.to_string(), Caller::admin(ADMIN))
                .await?;

            let order = ctx.orders.get_order_by_id(id, Caller::admin(ADMIN)).await?;

            assert_eq!(order.status, status);
        }

        Ok(())
    }

    #[tokio::test]
    async fn admin_may_move_delivered_order_back_to_pending() -> TestResult {
        let ctx = TestContext::new().await;
        let id = ctx.place_order(ALICE).await?;

        ctx.orders
            .admin_update_status(id, "delivered".to_string(), Caller::admin(ADMIN))
            .await?;
        ctx.orders
            .admin_update_status(id, "pending_payment".to_string(), Caller::admin(ADMIN))
            .await?;

        let order = ctx.orders.get_order_by_id(id, Caller::admin(ADMIN)).await?;

        assert_eq!(order.status, OrderStatus::PendingPayment);

        Ok(())
    }

    #[tokio::test]
    async fn admin_update_rejects_unknown_status() -> TestResult {
        let ctx = TestContext::new().await;
        let id = ctx.place_order(ALICE).await?;

        let result = ctx
            .orders
            .admin_update_status(id, "bogus".to_string(), Caller::admin(ADMIN))
            .await;

        assert!(
            matches!(result, Err(OrdersServiceError::InvalidInput(_))),
            "expected InvalidInput, got {result:?}"
        );

        let order = ctx.orders.get_order_by_id(id, Caller::admin(ADMIN)).await?;

        assert_eq!(order.status, OrderStatus::PendingPayment);

        Ok(())
    }

    #[tokio::test]
    async fn admin_update_unknown_order_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx
            .orders
            .admin_update_status(
                OrderId::from_i64(404),
                "paid".to_string(),
                Caller::admin(ADMIN),
            )
            .await;

        assert!(
            matches!(result, Err(OrdersServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn admin_only_operations_refuse_regular_users() -> TestResult {
        let ctx = TestContext::new().await;
        let id = ctx.place_order(ALICE).await?;
        let owner = Caller {
            user: ALICE,
            role: Role::User,
        };

        let update = ctx
            .orders
            .admin_update_status(id, "paid".to_string(), owner)
            .await;
        let delete = ctx.orders.delete_order(id, owner).await;

        assert!(
            matches!(update, Err(OrdersServiceError::Forbidden)),
            "expected Forbidden, got {update:?}"
        );
        assert!(
            matches!(delete, Err(OrdersServiceError::Forbidden)),
            "expected Forbidden, got {delete:?}"
        );
        assert_eq!(ctx.count_orders().await?, 1);

        Ok(())
    }

    #[tokio::test]
    async fn delete_order_removes_items_and_is_not_repeatable() -> TestResult {
        let ctx = TestContext::new().await;
        let id = ctx.place_order(ALICE).await?;

        ctx.orders.delete_order(id, Caller::admin(ADMIN)).await?;

        assert_eq!(ctx.count_orders().await?, 0);
        assert_eq!(ctx.count_order_items().await?, 0);

        let again = ctx.orders.delete_order(id, Caller::admin(ADMIN)).await;

        assert!(
            matches!(again, Err(OrdersServiceError::NotFound)),
            "expected NotFound, got {again:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn stats_count_orders_per_status_within_range() -> TestResult {
        let ctx = TestContext::new().await;
        let january = ctx.place_order(ALICE).await?;
        let cancelled = ctx.place_order(ALICE).await?;
        let february = ctx.place_order(BOB).await?;

        ctx.orders
            .cancel_order(cancelled, Caller::user(ALICE))
            .await?;

        ctx.set_order_date(january, ts("2026-01-10T12:00:00Z")?).await?;
        ctx.set_order_date(cancelled, ts("2026-01-20T12:00:00Z")?).await?;
        ctx.set_order_date(february, ts("2026-02-05T12:00:00Z")?).await?;

        let mut stats = ctx
            .orders
            .get_stats(StatsRange {
                from: Some(ts("2026-01-01T00:00:00Z")?),
                to: Some(ts("2026-01-31T23:59:59Z")?),
            })
            .await?;

        stats.sort_by_key(|count| count.status);

        assert_eq!(
            stats,
            vec![
                StatusCount {
                    status: OrderStatus::PendingPayment,
                    count: 1,
                },
                StatusCount {
                    status: OrderStatus::Cancelled,
                    count: 1,
                },
            ]
        );

        Ok(())
    }

    #[tokio::test]
    async fn stats_default_range_covers_current_month() -> TestResult {
        let ctx = TestContext::new().await;
        ctx.place_order(ALICE).await?;
        let backdated = ctx.place_order(ALICE).await?;

        ctx.set_order_date(backdated, Timestamp::now().checked_sub(960.hours())?)
            .await?;

        let stats = ctx.orders.get_stats(StatsRange::default()).await?;

        assert_eq!(
            stats,
            vec![StatusCount {
                status: OrderStatus::PendingPayment,
                count: 1,
            }]
        );

        Ok(())
    }

    #[tokio::test]
    async fn stats_reject_inverted_range() -> TestResult {
        let ctx = TestContext::new().await;

        let result = ctx
            .orders
            .get_stats(StatsRange {
                from: Some(ts("2026-02-01T00:00:00Z")?),
                to: Some(ts("2026-01-01T00:00:00Z")?),
            })
            .await;

        assert!(
            matches!(result, Err(OrdersServiceError::InvalidInput(_))),
            "expected InvalidInput, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn export_defaults_to_twenty_newest_orders() -> TestResult {
        let ctx = TestContext::new().await;

        let mut ids = Vec::new();

        for day in 1..=21 {
            let id = ctx.place_order(ALICE).await?;

            ctx.set_order_date(id, ts(&format!("2026-03-{day:02}T08:00:00Z"))?)
                .await?;

            ids.push(id);
        }

        let orders = ctx
            .orders
            .export_orders(ExportFilter {
                limit: Some(0),
                ..ExportFilter::default()
            })
            .await?;

        ids.reverse();
        ids.truncate(20);

        assert_eq!(
            orders.iter().map(|order| order.id).collect::<Vec<_>>(),
            ids
        );

        Ok(())
    }

    #[tokio::test]
    async fn export_treats_negative_offset_as_zero() -> TestResult {
        let ctx = TestContext::new().await;
        let first = ctx.place_order(ALICE).await?;
        let second = ctx.place_order(ALICE).await?;

        ctx.set_order_date(first, ts("2026-03-01T08:00:00Z")?).await?;
        ctx.set_order_date(second, ts("2026-03-02T08:00:00Z")?).await?;

        let orders = ctx
            .orders
            .export_orders(ExportFilter {
                limit: Some(1),
                offset: -5,
                ..ExportFilter::default()
            })
            .await?;

        assert_eq!(
            orders.iter().map(|order| order.id).collect::<Vec<_>>(),
            vec![second]
        );

        Ok(())
    }

    #[tokio::test]
    async fn export_applies_every_filter() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.create_product(100, 100).await?;

        ctx.orders
            .create_order(new_order(ALICE, &[(product, 1, 100)]))
            .await?;
        let large = ctx
            .orders
            .create_order(new_order(ALICE, &[(product, 10, 100)]))
            .await?;
        let cancelled = ctx
            .orders
            .create_order(new_order(ALICE, &[(product, 5, 100)]))
            .await?;
        ctx.orders
            .create_order(new_order(BOB, &[(product, 5, 100)]))
            .await?;

        ctx.orders
            .cancel_order(cancelled, Caller::user(ALICE))
            .await?;

        let orders = ctx
            .orders
            .export_orders(ExportFilter {
                user_id: Some(ALICE),
                status: Some(OrderStatus::PendingPayment),
                min_amount: Some(200),
                max_amount: Some(5_000),
                ..ExportFilter::default()
            })
            .await?;

        assert_eq!(
            orders.iter().map(|order| order.id).collect::<Vec<_>>(),
            vec![large]
        );
        assert_eq!(orders.first().map(|order| order.items.len()), Some(1));

        Ok(())
    }
}
