//! Order Data

use std::collections::BTreeMap;

use jiff::{Timestamp, Zoned};

use crate::domain::{
    identity::UserId,
    orders::{errors::OrdersServiceError, status::OrderStatus},
    products::records::ProductId,
};

/// Page size used when an export does not ask for one.
pub const DEFAULT_EXPORT_LIMIT: u32 = 20;

/// Largest amount the `BIGINT` money columns can hold.
const MAX_AMOUNT: u64 = i64::MAX.unsigned_abs();

/// New Order Item Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub quantity: u64,
    /// Unit price as supplied by the caller; not re-read from the catalog.
    pub price: u64,
}

impl NewOrderItem {
    /// `price * quantity`, or `None` on overflow.
    #[must_use]
    pub fn total_price(&self) -> Option<u64> {
        self.price.checked_mul(self.quantity)
    }
}

/// New Order Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub user_id: UserId,
    pub items: Vec<NewOrderItem>,
    pub pickup_point: String,
    pub delivery_date: Option<Timestamp>,
}

impl NewOrder {
    /// Validate the request shape and compute the order total.
    ///
    /// # Errors
    ///
    /// Returns [`OrdersServiceError::InvalidInput`] when there are no items, a quantity is
    /// zero, the pickup point is blank, or the total does not fit the money column.
    pub fn total_amount(&self) -> Result<u64, OrdersServiceError> {
        if self.items.is_empty() {
            return Err(OrdersServiceError::invalid_input(
                "order must contain at least one item",
            ));
        }

        if self.pickup_point.trim().is_empty() {
            return Err(OrdersServiceError::invalid_input("pickup point is required"));
        }

        self.items.iter().try_fold(0_u64, |total, item| {
            if item.quantity == 0 {
                return Err(OrdersServiceError::invalid_input(format!(
                    "quantity for product {} must be positive",
                    item.product_id
                )));
            }

            item.total_price()
                .and_then(|line| total.checked_add(line))
                .filter(|total| *total <= MAX_AMOUNT)
                .ok_or_else(|| OrdersServiceError::invalid_input("order total is out of range"))
        })
    }

    /// Total quantity per product, keyed in ascending product id order. Lines naming the
    /// same product are summed.
    ///
    /// # Errors
    ///
    /// Returns [`OrdersServiceError::InvalidInput`] when a product's summed quantity
    /// overflows.
    pub fn quantities_by_product(&self) -> Result<BTreeMap<ProductId, u64>, OrdersServiceError> {
        let mut quantities = BTreeMap::new();

        for item in &self.items {
            let quantity = quantities.entry(item.product_id).or_insert(0_u64);

            *quantity = quantity.checked_add(item.quantity).ok_or_else(|| {
                OrdersServiceError::invalid_input(format!(
                    "quantity for product {} is out of range",
                    item.product_id
                ))
            })?;
        }

        Ok(quantities)
    }
}

/// Filters for the admin order export. All present conditions must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportFilter {
    pub user_id: Option<UserId>,
    pub status: Option<OrderStatus>,
    pub min_amount: Option<u64>,
    pub max_amount: Option<u64>,
    /// `None` or `0` selects [`DEFAULT_EXPORT_LIMIT`].
    pub limit: Option<u32>,
    /// Negative offsets are treated as `0`.
    pub offset: i64,
}

/// Normalised `LIMIT` / `OFFSET` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl ExportFilter {
    #[must_use]
    pub fn page(&self) -> Page {
        let limit = match self.limit {
            None | Some(0) => DEFAULT_EXPORT_LIMIT,
            Some(limit) => limit,
        };

        Page {
            limit: i64::from(limit),
            offset: self.offset.max(0),
        }
    }
}

/// Order date window for status statistics. Missing bounds take defaults when resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsRange {
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
}

impl StatsRange {
    /// Resolve against `now`: `from` defaults to midnight on the first day of `now`'s
    /// month, `to` defaults to `now`.
    ///
    /// # Errors
    ///
    /// Returns [`OrdersServiceError::InvalidInput`] when the resolved `from` is after `to`.
    pub fn resolve(self, now: &Zoned) -> Result<(Timestamp, Timestamp), OrdersServiceError> {
        let from = match self.from {
            Some(from) => from,
            None => now.first_of_month()?.start_of_day()?.timestamp(),
        };

        let to = self.to.unwrap_or_else(|| now.timestamp());

        if from > to {
            return Err(OrdersServiceError::invalid_input(
                "stats range starts after it ends",
            ));
        }

        Ok((from, to))
    }
}
