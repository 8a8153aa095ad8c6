//! Dining Table Model

use serde::{Deserialize, Serialize};

/// Table occupancy status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TableStatus {
    #[default]
    Free,
    Occupied,
}

/// Dining table entity (桌台)
///
/// `current_order_id` 与桌台上唯一的活动订单保持一致，关单时同一事务内清空。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiningTable {
    pub id: String,
    pub number: u32,
    pub status: TableStatus,
    pub current_order_id: Option<String>,
}

impl DiningTable {
    /// A free table with no order attached
    pub fn new(id: impl Into<String>, number: u32) -> Self {
        Self {
            id: id.into(),
            number,
            status: TableStatus::Free,
            current_order_id: None,
        }
    }

    pub fn is_free(&self) -> bool {
        self.status == TableStatus::Free
    }
}

/// Create dining table payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiningTableCreate {
    pub number: u32,
}

/// Update dining table payload
///
/// 只允许改桌号；占用状态由订单生命周期维护。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiningTableUpdate {
    pub number: Option<u32>,
}

/// Per-status item counts of a table's active order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TableIndicators {
    pub new_count: u32,
    pub in_progress_count: u32,
    pub done_count: u32,
}

impl TableIndicators {
    /// 全部出品完成：至少一个 DONE，且没有待做/在做的项目
    pub fn is_ready(&self) -> bool {
        self.done_count > 0 && self.new_count == 0 && self.in_progress_count == 0
    }
}

/// Table with derived occupancy indicators (front-of-house overview)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableView {
    #[serde(flatten)]
    pub table: DiningTable,
    pub indicators: TableIndicators,
    pub ready: bool,
}
