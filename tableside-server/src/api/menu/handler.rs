//! Menu API Handlers

use axum::{Json, extract::State};
use shared::models::MenuItem;

use crate::auth::{Actor, Operation, authorize};
use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult, ok};

/// GET /api/menu - 可点菜品
pub async fn list(
    State(state): State<ServerState>,
    actor: Actor,
) -> AppResult<Json<ApiResponse<Vec<MenuItem>>>> {
    authorize(&actor, Operation::ViewMenu)?;
    let items: Vec<MenuItem> = state
        .catalog
        .list()
        .into_iter()
        .filter(|m| m.available)
        .collect();
    Ok(ok(items))
}
