//! Order Item API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use shared::models::{OrderItem, OrderItemStatus};

use crate::auth::Actor;
use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult, ok};

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: OrderItemStatus,
}

/// PATCH /api/order-items/{item_id}/status
pub async fn update_status(
    State(state): State<ServerState>,
    actor: Actor,
    Path(item_id): Path<String>,
    Json(payload): Json<StatusUpdate>,
) -> AppResult<Json<ApiResponse<OrderItem>>> {
    let item = state
        .orders
        .update_item_status(&actor, &item_id, payload.status)?;
    Ok(ok(item))
}
