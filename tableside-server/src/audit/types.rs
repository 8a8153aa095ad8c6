//! 审计日志类型定义
//!
//! 所有条目不可变、不可删除，支持 SHA256 哈希链防篡改。

use serde::{Deserialize, Serialize};

/// 审计操作类型（枚举，非自由文本）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuditAction {
    // ═══ 订单 ═══
    #[serde(rename = "order.opened")]
    OrderOpened,
    #[serde(rename = "order.sent")]
    OrderSent,
    #[serde(rename = "order.closed")]
    OrderClosed,

    // ═══ 订单明细 ═══
    #[serde(rename = "order.item.added")]
    OrderItemAdded,
    #[serde(rename = "order.item.status")]
    OrderItemStatus,

    // ═══ 管理操作 ═══
    #[serde(rename = "table.created")]
    TableCreated,
    #[serde(rename = "table.updated")]
    TableUpdated,
    #[serde(rename = "table.deleted")]
    TableDeleted,
}

impl AuditAction {
    pub const fn as_str(&self) -> &'static str {
        match self {
            AuditAction::OrderOpened => "order.opened",
            AuditAction::OrderSent => "order.sent",
            AuditAction::OrderClosed => "order.closed",
            AuditAction::OrderItemAdded => "order.item.added",
            AuditAction::OrderItemStatus => "order.item.status",
            AuditAction::TableCreated => "table.created",
            AuditAction::TableUpdated => "table.updated",
            AuditAction::TableDeleted => "table.deleted",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 审计日志条目（不可变）
///
/// - `prev_hash`: 前一条记录的哈希（首条为 `genesis`）
/// - `curr_hash`: 当前记录的哈希（包含 prev_hash + 所有字段）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// 全局递增序列号
    pub id: u64,
    /// 时间戳（Unix 毫秒）
    pub timestamp: i64,
    pub action: AuditAction,
    /// 资源类型（"order", "order_item", "table"）
    pub resource_type: String,
    pub resource_id: String,
    /// 操作人 ID
    pub operator_id: Option<String>,
    /// 结构化详情（JSON）
    pub details: serde_json::Value,
    pub prev_hash: String,
    pub curr_hash: String,
}

/// 审计日志列表响应
#[derive(Debug, Serialize)]
pub struct AuditListResponse {
    pub items: Vec<AuditEntry>,
    pub total: u64,
}

/// 审计链验证结果
#[derive(Debug, Serialize)]
pub struct AuditChainVerification {
    pub total_entries: u64,
    pub chain_intact: bool,
    pub breaks: Vec<AuditChainBreak>,
}

/// 审计链断裂点
#[derive(Debug, Serialize)]
pub struct AuditChainBreak {
    /// 断裂处的序列号
    pub entry_id: u64,
    pub expected_prev_hash: String,
    pub actual_prev_hash: String,
    /// 记录内容与 curr_hash 不符
    pub hash_mismatch: bool,
}
