//! Dining Table API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::{DiningTable, DiningTableCreate, DiningTableUpdate, Order, TableView};

use crate::auth::Actor;
use crate::core::ServerState;
use crate::tables::TableRemoval;
use crate::utils::{ApiResponse, AppResult, ok};

/// GET /api/tables - 桌台列表（含出品进度）
pub async fn list(
    State(state): State<ServerState>,
    actor: Actor,
) -> AppResult<Json<ApiResponse<Vec<TableView>>>> {
    let views = state.tables.list_with_indicators(&actor)?;
    Ok(ok(views))
}

/// POST /api/tables - 创建桌台 (admin)
pub async fn create(
    State(state): State<ServerState>,
    actor: Actor,
    Json(payload): Json<DiningTableCreate>,
) -> AppResult<Json<ApiResponse<DiningTable>>> {
    let table = state.tables.create_table(&actor, payload.number)?;
    Ok(ok(table))
}

/// PATCH /api/tables/{table_id} - 修改桌号 (admin)
pub async fn update(
    State(state): State<ServerState>,
    actor: Actor,
    Path(table_id): Path<String>,
    Json(payload): Json<DiningTableUpdate>,
) -> AppResult<Json<ApiResponse<DiningTable>>> {
    let table = state.tables.update_table(&actor, &table_id, payload)?;
    Ok(ok(table))
}

/// DELETE /api/tables/{table_id} - 删除桌台及其全部订单 (admin)
pub async fn delete(
    State(state): State<ServerState>,
    actor: Actor,
    Path(table_id): Path<String>,
) -> AppResult<Json<ApiResponse<TableRemoval>>> {
    let removal = state.tables.delete_table(&actor, &table_id)?;
    Ok(ok(removal))
}

/// POST /api/tables/{table_id}/open-order - 开台（幂等）
pub async fn open_order(
    State(state): State<ServerState>,
    actor: Actor,
    Path(table_id): Path<String>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let order = state.orders.open_order_for_table(&actor, &table_id)?;
    Ok(ok(order))
}
