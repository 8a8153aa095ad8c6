//! Order API 模块
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/orders/{order_id} | GET | 订单详情（含明细、桌台） |
//! | /api/orders/{order_id}/items | POST | 加菜 |
//! | /api/orders/{order_id}/send | POST | 送单到出品站 |
//! | /api/orders/{order_id}/close | POST | 关单并释放桌台 |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/{order_id}", get(handler::get_by_id))
        .route("/{order_id}/items", post(handler::add_item))
        .route("/{order_id}/send", post(handler::send))
        .route("/{order_id}/close", post(handler::close))
}
