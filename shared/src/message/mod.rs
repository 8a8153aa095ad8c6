//! Realtime protocol types
//!
//! 房间式推送协议：客户端显式 join 一个房间（`table:<id>` / `station:<KITCHEN|BAR>`），
//! 之后只收到发布到该房间的事件。无积压、无重放（at-most-once）。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::{OrderItem, Station};

/// Broadcast room
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Room {
    Table(String),
    Station(Station),
}

impl Room {
    pub fn table(table_id: impl Into<String>) -> Self {
        Room::Table(table_id.into())
    }

    pub fn station(station: Station) -> Self {
        Room::Station(station)
    }
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Room::Table(id) => write!(f, "table:{}", id),
            Room::Station(station) => write!(f, "station:{}", station),
        }
    }
}

/// Error returned when a room name cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid room name: {0}")]
pub struct InvalidRoom(pub String);

impl FromStr for Room {
    type Err = InvalidRoom;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidRoom(s.to_string());
        let (family, name) = s.split_once(':').ok_or_else(invalid)?;
        if name.is_empty() {
            return Err(invalid());
        }
        match family {
            "table" => Ok(Room::Table(name.to_string())),
            "station" => name
                .parse::<Station>()
                .map(Room::Station)
                .map_err(|_| invalid()),
            _ => Err(invalid()),
        }
    }
}

impl Serialize for Room {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Room {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Events published to rooms
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum RealtimeEvent {
    /// Single item changed (table + station rooms)
    ItemUpdate(OrderItem),
    /// Order sent to preparation, full item list (table room)
    OrderSent {
        order_id: String,
        items: Vec<OrderItem>,
    },
    /// Order closed (table room)
    OrderClosed { order_id: String },
    /// Item added to an already-sent order (station room)
    NewItem(OrderItem),
    /// Batch of items for one station when an order is sent (station room)
    NewItems(Vec<OrderItem>),
}

impl RealtimeEvent {
    /// Wire name of the event
    pub fn name(&self) -> &'static str {
        match self {
            RealtimeEvent::ItemUpdate(_) => "item_update",
            RealtimeEvent::OrderSent { .. } => "order_sent",
            RealtimeEvent::OrderClosed { .. } => "order_closed",
            RealtimeEvent::NewItem(_) => "new_item",
            RealtimeEvent::NewItems(_) => "new_items",
        }
    }
}

/// Client → Server 房间订阅控制
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    Join { room: String },
    Leave { room: String },
}

/// Server → Client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    Joined {
        room: String,
    },
    Left {
        room: String,
    },
    /// An event published to a joined room: `{room, event, data}`
    Event {
        room: String,
        event: String,
        data: serde_json::Value,
    },
    Error {
        message: String,
    },
}

impl ServerFrame {
    /// Build an `event` frame for a room
    pub fn event(room: &Room, event: &RealtimeEvent) -> Result<Self, serde_json::Error> {
        let mut value = serde_json::to_value(event)?;
        let data = value
            .get_mut("data")
            .map(serde_json::Value::take)
            .unwrap_or(serde_json::Value::Null);
        Ok(ServerFrame::Event {
            room: room.to_string(),
            event: event.name().to_string(),
            data,
        })
    }

    pub fn error(message: impl Into<String>) -> Self {
        ServerFrame::Error {
            message: message.into(),
        }
    }
}
