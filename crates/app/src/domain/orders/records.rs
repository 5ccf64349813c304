//! Order Records

use jiff::Timestamp;
use serde::Serialize;

use crate::{
    domain::{identity::UserId, orders::status::OrderStatus, products::records::ProductId},
    ids::TypedId,
};

/// Order Id
pub type OrderId = TypedId<OrderRecord>;

/// Order Item Id
pub type OrderItemId = TypedId<OrderItemRecord>;

/// Order Record
#[derive(Debug, Clone, Serialize)]
pub struct OrderRecord {
    pub id: OrderId,
    pub user_id: UserId,
    pub status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_date: Option<Timestamp>,
    pub pickup_point: String,
    pub order_date: Timestamp,
    /// Sum of `price * quantity` over the items, fixed at creation.
    pub total_amount: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<OrderItemRecord>,
}

/// Order Item Record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderItemRecord {
    pub id: OrderItemId,
    #[serde(skip)]
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: u64,
    /// Unit price captured when the order was placed.
    pub price: u64,
    pub total_price: u64,
}

/// Number of orders in a given status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status: OrderStatus,
    pub count: u64,
}
