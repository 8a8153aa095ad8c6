//! Shared types for the tableside order service
//!
//! Domain models, realtime wire types and the unified error system used by
//! `tableside-server` and by Rust clients talking to it.

pub mod error;
pub mod message;
pub mod models;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
pub use message::{ClientFrame, RealtimeEvent, Room, ServerFrame};
