//! RoomHub — 房间式广播
//!
//! 每个房间一个 `broadcast::Sender`，首次订阅时创建，最后一个订阅者离开后回收。

use dashmap::DashMap;
use shared::message::{RealtimeEvent, Room};
use shared::models::Station;
use std::sync::Arc;
use tokio::sync::broadcast;

use super::Broadcaster;

/// One published event, as seen by room subscribers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomMessage {
    pub room: Room,
    pub event: RealtimeEvent,
}

#[derive(Clone)]
pub struct RoomHub {
    /// room name → sender
    rooms: Arc<DashMap<String, broadcast::Sender<Arc<RoomMessage>>>>,
    capacity: usize,
}

impl std::fmt::Debug for RoomHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomHub")
            .field("rooms", &self.rooms.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl RoomHub {
    pub fn new(capacity: usize) -> Self {
        Self {
            rooms: Arc::new(DashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Join a room
    pub fn subscribe(&self, room: &Room) -> broadcast::Receiver<Arc<RoomMessage>> {
        self.rooms
            .entry(room.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Publish to a room, returns the number of receivers reached
    ///
    /// A room nobody joined drops the event; a room whose last subscriber is
    /// gone is removed.
    pub fn publish(&self, room: Room, event: RealtimeEvent) -> usize {
        let name = room.to_string();
        let kind = event.name();

        let sent = match self.rooms.get(&name) {
            Some(tx) => tx.send(Arc::new(RoomMessage { room, event })).ok(),
            None => None,
        };

        match sent {
            Some(n) => {
                tracing::debug!(room = %name, event = kind, receivers = n, "Event published");
                n
            }
            None => {
                tracing::debug!(room = %name, event = kind, "No subscribers, event dropped");
                self.rooms.remove_if(&name, |_, tx| tx.receiver_count() == 0);
                0
            }
        }
    }

    /// Drop the room's channel once nobody listens any more
    pub fn prune(&self, room: &Room) {
        self.rooms
            .remove_if(&room.to_string(), |_, tx| tx.receiver_count() == 0);
    }

    pub fn subscriber_count(&self, room: &Room) -> usize {
        self.rooms
            .get(&room.to_string())
            .map(|tx| tx.receiver_count())
            .unwrap_or(0)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

impl Broadcaster for RoomHub {
    fn publish_to_table(&self, table_id: &str, event: RealtimeEvent) {
        self.publish(Room::table(table_id), event);
    }

    fn publish_to_station(&self, station: Station, event: RealtimeEvent) {
        self.publish(Room::station(station), event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn closed(order_id: &str) -> RealtimeEvent {
        RealtimeEvent::OrderClosed {
            order_id: order_id.to_string(),
        }
    }

    #[tokio::test]
    async fn only_joined_rooms_receive() {
        let hub = RoomHub::new(16);
        let mut table_rx = hub.subscribe(&Room::table("t-4"));
        let mut bar_rx = hub.subscribe(&Room::station(Station::Bar));

        hub.publish_to_table("t-4", closed("o-1"));

        let msg = table_rx.recv().await.unwrap();
        assert_eq!(msg.room, Room::table("t-4"));
        assert_eq!(msg.event, closed("o-1"));
        assert!(bar_rx.try_recv().is_err());
    }

    #[test]
    fn publish_without_subscribers_is_dropped() {
        let hub = RoomHub::new(16);
        assert_eq!(hub.publish(Room::table("t-9"), closed("o-1")), 0);
        assert_eq!(hub.room_count(), 0);
    }

    #[tokio::test]
    async fn no_replay_for_late_joiners() {
        let hub = RoomHub::new(16);
        let _early = hub.subscribe(&Room::station(Station::Kitchen));
        hub.publish_to_station(Station::Kitchen, closed("o-1"));

        let mut late = hub.subscribe(&Room::station(Station::Kitchen));
        assert!(late.try_recv().is_err());
    }

    #[test]
    fn prune_removes_empty_rooms() {
        let hub = RoomHub::new(16);
        let room = Room::table("t-1");
        let rx = hub.subscribe(&room);
        hub.prune(&room);
        assert_eq!(hub.subscriber_count(&room), 1);

        drop(rx);
        hub.prune(&room);
        assert_eq!(hub.room_count(), 0);
    }
}
