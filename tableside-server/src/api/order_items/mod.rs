//! Order Item API 模块 (出品站更新状态)

mod handler;

use axum::{Router, routing::patch};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/order-items/{item_id}/status", patch(handler::update_status))
}
