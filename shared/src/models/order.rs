//! Order Model

use serde::{Deserialize, Serialize};

use super::dining_table::DiningTable;
use super::order_item::OrderItem;

/// Order status
///
/// Forward only: OPEN → SENT → CLOSED, or OPEN → CLOSED. Nothing leaves CLOSED.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Open,
    Sent,
    Closed,
}

impl OrderStatus {
    /// OPEN 或 SENT 均视为活动订单
    pub fn is_active(&self) -> bool {
        !matches!(self, OrderStatus::Closed)
    }
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Order {
    pub id: String,
    pub table_id: String,
    pub status: OrderStatus,
    pub created_by_actor_id: String,
    /// Unix millis
    pub created_at: i64,
    pub closed_at: Option<i64>,
}

/// Order with its items and table reference
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub table: Option<DiningTable>,
}
