//! WebSocket endpoint — 房间订阅
//!
//! GET /ws
//!
//! 协议:
//! - Client → Server: `{"type":"join","room":"station:KITCHEN"}` / `{"type":"leave","room":...}`
//! - Server → Client: `joined` / `left` / `event` (`{room, event, data}`) / `error`

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use shared::message::{ClientFrame, Room, ServerFrame};
use std::collections::HashMap;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::Duration;

use super::RoomHub;
use crate::core::ServerState;

/// Outbound frames buffered per connection
const OUTBOUND_CAPACITY: usize = 256;

const PING_INTERVAL: Duration = Duration::from_secs(30);

/// GET /ws
pub async fn handle_ws(State(state): State<ServerState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    let hub = state.rooms.clone();
    ws.on_upgrade(move |socket| ws_session(socket, hub))
}

async fn ws_session(socket: WebSocket, hub: RoomHub) {
    let (mut sink, mut stream) = socket.split();
    let (out_tx, mut out_rx) = mpsc::channel::<ServerFrame>(OUTBOUND_CAPACITY);

    // room name → forwarding task
    let mut joined: HashMap<String, (Room, JoinHandle<()>)> = HashMap::new();

    tracing::debug!("Realtime WS connected");

    let mut ping_interval = tokio::time::interval(PING_INTERVAL);
    ping_interval.tick().await; // skip immediate

    loop {
        tokio::select! {
            _ = ping_interval.tick() => {
                if sink.send(Message::Ping(vec![].into())).await.is_err() {
                    break;
                }
            }

            frame = out_rx.recv() => {
                // out_tx is held by this loop, recv never yields None here
                if let Some(frame) = frame
                    && send_frame(&mut sink, &frame).await.is_err()
                {
                    break;
                }
            }

            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let reply = handle_client_frame(text.as_str(), &hub, &out_tx, &mut joined).await;
                        if send_frame(&mut sink, &reply).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Pong(_))) => {}
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(_)) => break,
                    _ => {}
                }
            }
        }
    }

    for (_, (room, task)) in joined.drain() {
        task.abort();
        // wait until the task has dropped its receiver
        let _ = task.await;
        hub.prune(&room);
    }

    tracing::debug!("Realtime WS disconnected");
}

/// Apply a join/leave frame, returns the reply frame
async fn handle_client_frame(
    text: &str,
    hub: &RoomHub,
    out_tx: &mpsc::Sender<ServerFrame>,
    joined: &mut HashMap<String, (Room, JoinHandle<()>)>,
) -> ServerFrame {
    let frame = match serde_json::from_str::<ClientFrame>(text) {
        Ok(frame) => frame,
        Err(e) => return ServerFrame::error(format!("invalid frame: {}", e)),
    };

    match frame {
        ClientFrame::Join { room } => {
            let parsed: Room = match room.parse() {
                Ok(r) => r,
                Err(e) => return ServerFrame::error(format!("{}", e)),
            };
            let name = parsed.to_string();
            if !joined.contains_key(&name) {
                let rx = hub.subscribe(&parsed);
                let task = tokio::spawn(forward_room(rx, out_tx.clone()));
                tracing::debug!(room = %name, "Joined room");
                joined.insert(name.clone(), (parsed, task));
            }
            ServerFrame::Joined { room: name }
        }
        ClientFrame::Leave { room } => {
            let name = match room.parse::<Room>() {
                Ok(r) => r.to_string(),
                Err(e) => return ServerFrame::error(format!("{}", e)),
            };
            if let Some((parsed, task)) = joined.remove(&name) {
                task.abort();
                // the receiver is only released once the aborted task is dropped
                let _ = task.await;
                hub.prune(&parsed);
                tracing::debug!(room = %name, "Left room");
            }
            ServerFrame::Left { room: name }
        }
    }
}

/// Forward one room's broadcasts into the connection's outbound queue
async fn forward_room(
    mut rx: broadcast::Receiver<std::sync::Arc<super::RoomMessage>>,
    out_tx: mpsc::Sender<ServerFrame>,
) {
    loop {
        match rx.recv().await {
            Ok(msg) => {
                let frame = match ServerFrame::event(&msg.room, &msg.event) {
                    Ok(frame) => frame,
                    Err(e) => {
                        tracing::error!(room = %msg.room, "Failed to encode event: {}", e);
                        continue;
                    }
                };
                if out_tx.send(frame).await.is_err() {
                    break;
                }
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                // 无重放：跳过丢失的事件，客户端自行重新拉取
                tracing::warn!(lagged = n, "Room subscriber lagged, events skipped");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

async fn send_frame<S>(sink: &mut S, frame: &ServerFrame) -> Result<(), ()>
where
    S: futures::Sink<Message, Error = axum::Error> + Unpin,
{
    let json = serde_json::to_string(frame).map_err(|_| ())?;
    sink.send(Message::Text(json.into())).await.map_err(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::message::RealtimeEvent;
    use shared::models::Station;

    #[tokio::test]
    async fn join_forwards_room_events() {
        let hub = RoomHub::new(16);
        let (out_tx, mut out_rx) = mpsc::channel(16);
        let mut joined = HashMap::new();

        let reply = handle_client_frame(
            r#"{"type":"join","room":"station:kitchen"}"#,
            &hub,
            &out_tx,
            &mut joined,
        )
        .await;
        assert_eq!(
            reply,
            ServerFrame::Joined {
                room: "station:KITCHEN".into()
            }
        );

        hub.publish(
            Room::station(Station::Kitchen),
            RealtimeEvent::OrderClosed {
                order_id: "o-1".into(),
            },
        );

        match out_rx.recv().await.unwrap() {
            ServerFrame::Event { room, event, data } => {
                assert_eq!(room, "station:KITCHEN");
                assert_eq!(event, "order_closed");
                assert_eq!(data["order_id"], "o-1");
            }
            other => panic!("Expected event frame, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn invalid_room_is_rejected() {
        let hub = RoomHub::new(16);
        let (out_tx, _out_rx) = mpsc::channel(16);
        let mut joined = HashMap::new();

        let reply = handle_client_frame(
            r#"{"type":"join","room":"lobby"}"#,
            &hub,
            &out_tx,
            &mut joined,
        )
        .await;
        assert!(matches!(reply, ServerFrame::Error { .. }));
        assert!(joined.is_empty());
    }

    #[tokio::test]
    async fn leave_stops_forwarding() {
        let hub = RoomHub::new(16);
        let (out_tx, _out_rx) = mpsc::channel(16);
        let mut joined = HashMap::new();

        handle_client_frame(r#"{"type":"join","room":"table:t-1"}"#, &hub, &out_tx, &mut joined)
            .await;
        assert_eq!(hub.room_count(), 1);

        let reply =
            handle_client_frame(r#"{"type":"leave","room":"table:t-1"}"#, &hub, &out_tx, &mut joined)
                .await;

        assert_eq!(reply, ServerFrame::Left { room: "table:t-1".into() });
        assert!(joined.is_empty());
        // the room is released as soon as its last member leaves
        assert_eq!(hub.room_count(), 0);
        assert_eq!(hub.subscriber_count(&Room::table("t-1")), 0);
    }
}
