//! Audit Log API Handlers

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};

use crate::audit::{AuditChainVerification, AuditEntry};
use crate::auth::{Actor, Operation, authorize};
use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult, ok};

const DEFAULT_LIMIT: usize = 50;
const MAX_LIMIT: usize = 500;

#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    pub limit: Option<usize>,
}

/// 最近审计日志 + 链校验结果
#[derive(Debug, Serialize)]
pub struct AuditLogPage {
    pub items: Vec<AuditEntry>,
    pub total: u64,
    pub chain: AuditChainVerification,
}

/// GET /api/audit?limit= — 最近 N 条（新的在前）
pub async fn list(
    State(state): State<ServerState>,
    actor: Actor,
    Query(query): Query<AuditQuery>,
) -> AppResult<Json<ApiResponse<AuditLogPage>>> {
    authorize(&actor, Operation::ReadAudit)?;

    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let page = state.audit.query_last(limit)?;
    let chain = state.audit.verify_chain()?;
    Ok(ok(AuditLogPage {
        items: page.items,
        total: page.total,
        chain,
    }))
}

/// GET /api/audit/verify — 验证审计链完整性
pub async fn verify_chain(
    State(state): State<ServerState>,
    actor: Actor,
) -> AppResult<Json<ApiResponse<AuditChainVerification>>> {
    authorize(&actor, Operation::ReadAudit)?;
    Ok(ok(state.audit.verify_chain()?))
}
