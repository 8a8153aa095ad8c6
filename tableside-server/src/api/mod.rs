//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查 (公共)
//! - [`tables`] - 桌台列表、创建、开台
//! - [`orders`] - 订单详情、加菜、送单、关单
//! - [`order_items`] - 出品状态更新
//! - [`stations`] - 出品站队列
//! - [`menu`] - 菜单
//! - [`audit_log`] - 审计日志 (管理员)
//! - `/ws` - 实时房间推送 (公共)
//!
//! 除 `/health` 与 `/ws` 外，所有接口都需要 `X-Actor-Id` / `X-Actor-Role` 请求头。

pub mod audit_log;
pub mod health;
pub mod menu;
pub mod order_items;
pub mod orders;
pub mod stations;
pub mod tables;

use axum::{Router, middleware, routing::get};
use http::{HeaderName, HeaderValue};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Custom request ID generator
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = uuid::Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// HTTP 请求日志中间件
async fn log_request(
    request: http::Request<axum::body::Body>,
    next: middleware::Next,
) -> http::Response<axum::body::Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    tracing::info!(target: "http_access", "{} {} {}", method, uri, response.status());
    response
}

/// Build the REST router (without state, without `/ws`)
pub fn build_router() -> Router<ServerState> {
    Router::<ServerState>::new()
        .merge(health::router())
        .merge(tables::router())
        .merge(orders::router())
        .merge(order_items::router())
        .merge(stations::router())
        .merge(menu::router())
        .merge(audit_log::router())
}

/// Build a fully configured application with all middleware and state
///
/// Used by both the HTTP server and in-process tests.
pub fn build_app(state: &ServerState) -> Router {
    health::mark_started();

    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);
    build_router()
        // Gzip JSON responses only; the WebSocket upgrade stays untouched
        .layer(CompressionLayer::new())
        .route("/ws", get(crate::realtime::ws::handle_ws))
        .with_state(state.clone())
        // ========== Tower HTTP Middleware ==========
        .layer(cors_layer(&state.config.cors_origins))
        .layer(middleware::from_fn(log_request))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(SetRequestIdLayer::new(request_id, XRequestId))
}

/// Permissive when no origins are configured
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}
