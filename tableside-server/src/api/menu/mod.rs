//! Menu API 模块 (只读)

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/menu", get(handler::list))
}
