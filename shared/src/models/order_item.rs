//! Order Item Model

use serde::{Deserialize, Serialize};

use super::station::Station;

/// Preparation status of a single order item
///
/// Declaration order is the queue order: NEW sorts before IN_PROGRESS.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderItemStatus {
    #[default]
    New,
    InProgress,
    Done,
    Cancelled,
}

impl OrderItemStatus {
    /// Still waiting on, or being worked by, a station
    pub fn is_pending(&self) -> bool {
        matches!(self, OrderItemStatus::New | OrderItemStatus::InProgress)
    }

    /// Forward-only transition table
    ///
    /// NEW → IN_PROGRESS → DONE, NEW | IN_PROGRESS → CANCELLED.
    /// Setting the current status again is accepted.
    pub fn can_transition_to(&self, to: OrderItemStatus) -> bool {
        use OrderItemStatus::*;
        if *self == to {
            return true;
        }
        matches!(
            (self, to),
            (New, InProgress) | (InProgress, Done) | (New, Cancelled) | (InProgress, Cancelled)
        )
    }
}

/// Order item
///
/// `station`、`name_snapshot`、`unit_price_cents` 在创建时从菜单快照，之后不再变化。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub menu_item_id: String,
    pub name_snapshot: String,
    /// Unit price in cents at the time the item was added
    pub unit_price_cents: i64,
    pub quantity: u32,
    pub notes: Option<String>,
    pub station: Station,
    pub status: OrderItemStatus,
    /// Unix millis
    pub created_at: i64,
    /// Global creation sequence, tie-breaker for equal `created_at`
    pub seq: u64,
}
