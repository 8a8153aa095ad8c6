//! 健康检查路由
//!
//! | 路径 | 方法 | 说明 | 认证 |
//! |------|------|------|------|
//! | /health | GET | 健康检查 | 无 |
//!
//! ```json
//! {
//!   "status": "ok",
//!   "version": "0.1.0",
//!   "uptime_seconds": 42,
//!   "rooms": 3
//! }
//! ```

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use std::sync::OnceLock;

use crate::core::ServerState;

/// 健康检查路由 - 公共路由 (无需认证)
pub fn router() -> Router<ServerState> {
    Router::new().route("/health", get(health))
}

#[derive(Serialize)]
pub struct HealthResponse {
    /// 状态 (ok | error)
    status: &'static str,
    version: &'static str,
    uptime_seconds: i64,
    /// 当前有订阅者的房间数
    rooms: usize,
}

// 服务器启动时间 (懒加载静态变量)
static START_TIME: OnceLock<chrono::DateTime<chrono::Utc>> = OnceLock::new();

/// 记录启动时间，在构建路由时调用
pub(crate) fn mark_started() {
    START_TIME.get_or_init(chrono::Utc::now);
}

fn uptime_seconds() -> i64 {
    let start = START_TIME.get_or_init(chrono::Utc::now);
    (chrono::Utc::now() - *start).num_seconds().max(0)
}

async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: uptime_seconds(),
        rooms: state.rooms.room_count(),
    })
}
