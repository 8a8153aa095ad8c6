//! Actor Extractor
//!
//! 从请求头读取调用方提供的身份：`X-Actor-Id` + `X-Actor-Role`。

use axum::{extract::FromRequestParts, http::request::Parts};
use shared::error::{AppError, ErrorCode};

use crate::auth::{Actor, Role};
use crate::core::ServerState;
use crate::security_log;

pub const ACTOR_ID_HEADER: &str = "x-actor-id";
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";

/// Use this extractor in handlers to require a caller identity
impl FromRequestParts<ServerState> for Actor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(actor) = parts.extensions.get::<Actor>() {
            return Ok(actor.clone());
        }

        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|h| h.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        let (Some(id), Some(role)) = (header(ACTOR_ID_HEADER), header(ACTOR_ROLE_HEADER)) else {
            security_log!("WARN", "actor_missing", uri = format!("{:?}", parts.uri));
            return Err(AppError::not_authenticated());
        };

        let role: Role = role.parse().map_err(|e: String| {
            AppError::with_message(ErrorCode::NotAuthenticated, e).with_detail("role", role)
        })?;

        let actor = Actor::new(id, role);
        parts.extensions.insert(actor.clone());
        Ok(actor)
    }
}
