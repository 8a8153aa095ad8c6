//! Dining Table API 模块

mod handler;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/tables", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route(
            "/{table_id}",
            patch(handler::update).delete(handler::delete),
        )
        .route("/{table_id}/open-order", post(handler::open_order))
}
