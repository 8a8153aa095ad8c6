//! Station Queue API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::{QueueEntry, Station};

use crate::auth::Actor;
use crate::core::ServerState;
use crate::utils::{ApiResponse, AppError, AppResult, ok};

/// GET /api/stations/{station}/queue - `kitchen` / `bar`（不区分大小写）
pub async fn queue(
    State(state): State<ServerState>,
    actor: Actor,
    Path(station): Path<String>,
) -> AppResult<Json<ApiResponse<Vec<QueueEntry>>>> {
    let station: Station = station
        .parse()
        .map_err(|e: shared::models::UnknownStation| {
            AppError::validation(e.to_string()).with_detail("station", station.clone())
        })?;
    let entries = state.queue.get_queue(&actor, station)?;
    Ok(ok(entries))
}
