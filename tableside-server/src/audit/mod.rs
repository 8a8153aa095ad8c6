//! 审计日志模块 — 防篡改审计追踪
//!
//! # 架构
//!
//! ```text
//! 订单状态变更（commit 之后）
//!   └─ AuditService::log() → try_send → mpsc → AuditWorker → redb (audit.redb)
//!
//! SHA256 哈希链: genesis → entry₁ → entry₂ → ... → entryₙ
//! ```
//!
//! 写入是 fire-and-forget：通道满或已关闭时只记录告警，绝不阻塞或失败主流程。
//!
//! # 防篡改保证
//!
//! - **SHA256 哈希链**: 每条记录包含前一条的哈希
//! - **Append-only**: 无删除/更新接口
//! - **链验证**: [`AuditStorage::verify_chain`] 可随时验证完整性

pub mod service;
pub mod storage;
pub mod types;
pub mod worker;

pub use service::{AuditLogRequest, AuditService};
pub use storage::{AuditStorage, AuditStorageError};
pub use types::{AuditAction, AuditChainBreak, AuditChainVerification, AuditEntry, AuditListResponse};
pub use worker::AuditWorker;
