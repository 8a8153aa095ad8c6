//! Order API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::{Order, OrderDetail, OrderItem};

use crate::auth::Actor;
use crate::core::ServerState;
use crate::orders::AddItemInput;
use crate::utils::{ApiResponse, AppResult, ok};

/// GET /api/orders/{order_id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    actor: Actor,
    Path(order_id): Path<String>,
) -> AppResult<Json<ApiResponse<OrderDetail>>> {
    let detail = state.orders.get_order(&actor, &order_id)?;
    Ok(ok(detail))
}

/// POST /api/orders/{order_id}/items
pub async fn add_item(
    State(state): State<ServerState>,
    actor: Actor,
    Path(order_id): Path<String>,
    Json(input): Json<AddItemInput>,
) -> AppResult<Json<ApiResponse<OrderItem>>> {
    let item = state.orders.add_item(&actor, &order_id, input)?;
    Ok(ok(item))
}

/// POST /api/orders/{order_id}/send
pub async fn send(
    State(state): State<ServerState>,
    actor: Actor,
    Path(order_id): Path<String>,
) -> AppResult<Json<ApiResponse<OrderDetail>>> {
    let detail = state.orders.send_order(&actor, &order_id)?;
    Ok(ok(detail))
}

/// POST /api/orders/{order_id}/close
pub async fn close(
    State(state): State<ServerState>,
    actor: Actor,
    Path(order_id): Path<String>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let order = state.orders.close_order(&actor, &order_id)?;
    Ok(ok(order))
}
