//! 实时推送
//!
//! ```text
//! OrdersManager (commit 之后)
//!       │ publish_to_table / publish_to_station
//!       ▼
//! RoomHub ── rooms: room name → broadcast::Sender
//!       │
//!       ▼
//! WS session (join/leave) ── mpsc ──▶ socket
//! ```
//!
//! 无积压、无重放：发布时不在房间里的客户端永久错过该事件，重连后需重新拉取。

pub mod hub;
pub mod ws;

pub use hub::{RoomHub, RoomMessage};

use shared::message::RealtimeEvent;
use shared::models::Station;

/// Publish capability handed to the order core
///
/// Implementations must not block; delivery is best effort.
pub trait Broadcaster: Send + Sync {
    fn publish_to_table(&self, table_id: &str, event: RealtimeEvent);
    fn publish_to_station(&self, station: Station, event: RealtimeEvent);
}
