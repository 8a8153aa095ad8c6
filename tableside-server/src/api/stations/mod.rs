//! Station Queue API 模块

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/stations/{station}/queue", get(handler::queue))
}
