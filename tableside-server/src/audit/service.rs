//! 审计日志服务
//!
//! `AuditService` 提供：
//! - 日志写入（mpsc 通道，非阻塞 `try_send`）
//! - 日志查询与链验证（直接读取 storage）

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use super::storage::{AuditStorage, AuditStorageError};
use super::types::*;

/// 发送到 AuditWorker 的日志请求
#[derive(Debug)]
pub struct AuditLogRequest {
    pub action: AuditAction,
    pub resource_type: String,
    pub resource_id: String,
    pub operator_id: Option<String>,
    pub details: serde_json::Value,
}

/// 审计日志服务
pub struct AuditService {
    storage: AuditStorage,
    tx: mpsc::Sender<AuditLogRequest>,
}

impl std::fmt::Debug for AuditService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditService")
            .field("capacity", &self.tx.capacity())
            .finish_non_exhaustive()
    }
}

impl AuditService {
    /// 创建审计服务，返回的 Receiver 交给 [`super::AuditWorker::run`]
    pub fn new(
        storage: AuditStorage,
        buffer_size: usize,
    ) -> (Arc<Self>, mpsc::Receiver<AuditLogRequest>) {
        let (tx, rx) = mpsc::channel(buffer_size.max(1));
        (Arc::new(Self { storage, tx }), rx)
    }

    /// 记录审计日志（fire-and-forget）
    ///
    /// 通道满或 worker 已停止时丢弃并告警，调用方不受影响。
    pub fn log(
        &self,
        action: AuditAction,
        resource_type: impl Into<String>,
        resource_id: impl Into<String>,
        operator_id: Option<String>,
        details: serde_json::Value,
    ) {
        let req = AuditLogRequest {
            action,
            resource_type: resource_type.into(),
            resource_id: resource_id.into(),
            operator_id,
            details,
        };

        match self.tx.try_send(req) {
            Ok(()) => {}
            Err(TrySendError::Full(req)) => {
                tracing::warn!(
                    action = %req.action,
                    resource_id = %req.resource_id,
                    "Audit channel full, entry dropped"
                );
            }
            Err(TrySendError::Closed(req)) => {
                tracing::error!(
                    action = %req.action,
                    resource_id = %req.resource_id,
                    "Audit log channel closed, entry dropped"
                );
            }
        }
    }

    /// 最近 N 条审计日志
    pub fn query_last(&self, limit: usize) -> Result<AuditListResponse, AuditStorageError> {
        let (items, total) = self.storage.query_last(limit)?;
        Ok(AuditListResponse { items, total })
    }

    /// 验证审计链完整性
    pub fn verify_chain(&self) -> Result<AuditChainVerification, AuditStorageError> {
        self.storage.verify_chain()
    }

    /// 获取存储引用
    pub fn storage(&self) -> &AuditStorage {
        &self.storage
    }
}
