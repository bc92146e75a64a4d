//! Realtime HTTP Routes and WebSocket Handler
//!
//! Clients connect to `/realtime/ws`, subscribe to topics (`roster:A`,
//! `holds:C`, ...), and receive change events as they are published. A
//! lagging client loses old events rather than blocking publishers; clients
//! detect the gap by the sequence number and re-fetch.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc, RwLock};
use tokio::task::JoinHandle;

use crate::realtime::{parse_topic, ChangeEvent, Notifier, TopicStats};

// ==================
// Shared State
// ==================

/// Realtime state shared across handlers
pub struct RealtimeState {
    pub notifier: Arc<Notifier>,
    pub active_connections: Arc<RwLock<usize>>,
}

impl RealtimeState {
    pub fn new(notifier: Arc<Notifier>) -> Self {
        Self {
            notifier,
            active_connections: Arc::new(RwLock::new(0)),
        }
    }
}

// ==================
// Request/Response Types
// ==================

#[derive(Debug, Serialize)]
pub struct RealtimeStatsResponse {
    pub active_connections: usize,
    pub last_sequence: u64,
    pub topics: Vec<TopicStats>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WebSocketMessage {
    #[serde(rename = "type")]
    pub msg_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WebSocketMessage {
    pub fn connected() -> Self {
        Self {
            msg_type: "connected".to_string(),
            topic: None,
            error: None,
        }
    }

    pub fn subscribed(topic: String) -> Self {
        Self {
            msg_type: "subscribed".to_string(),
            topic: Some(topic),
            error: None,
        }
    }

    pub fn unsubscribed(topic: String) -> Self {
        Self {
            msg_type: "unsubscribed".to_string(),
            topic: Some(topic),
            error: None,
        }
    }

    pub fn error(msg: String) -> Self {
        Self {
            msg_type: "error".to_string(),
            topic: None,
            error: Some(msg),
        }
    }
}

// ==================
// Realtime Routes
// ==================

/// Create realtime routes with WebSocket support
pub fn realtime_routes(state: Arc<RealtimeState>) -> Router {
    Router::new()
        .route("/ws", get(websocket_handler))
        .route("/stats", get(stats_handler))
        .with_state(state)
}

// ==================
// Handlers
// ==================

async fn stats_handler(State(state): State<Arc<RealtimeState>>) -> impl IntoResponse {
    let active_connections = *state.active_connections.read().await;
    Json(RealtimeStatsResponse {
        active_connections,
        last_sequence: state.notifier.last_sequence(),
        topics: state.notifier.stats(),
    })
}

/// Handle WebSocket upgrade request
async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<RealtimeState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_websocket(socket, state))
}

/// Handle individual WebSocket connection
async fn handle_websocket(socket: WebSocket, state: Arc<RealtimeState>) {
    {
        let mut count = state.active_connections.write().await;
        *count += 1;
    }

    let (mut sender, mut receiver) = socket.split();

    // Per-topic forwarding tasks funnel broadcast events into one channel
    // so this loop owns the only write half of the socket.
    let (event_tx, mut event_rx) = mpsc::channel::<ChangeEvent>(64);
    let mut forwards: HashMap<String, JoinHandle<()>> = HashMap::new();

    send_message(&mut sender, &WebSocketMessage::connected()).await;

    loop {
        tokio::select! {
            Some(event) = event_rx.recv() => {
                let json = event.to_wire().to_string();
                if sender.send(Message::Text(json)).await.is_err() {
                    break;
                }
            }
            incoming = receiver.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        let reply = match serde_json::from_str::<WebSocketMessage>(&text) {
                            Ok(msg) => {
                                handle_ws_message(msg, &state, &event_tx, &mut forwards)
                            }
                            Err(_) => WebSocketMessage::error("Invalid message format".to_string()),
                        };
                        if !send_message(&mut sender, &reply).await {
                            break;
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = sender.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(_)) => break,
                    _ => {}
                }
            }
        }
    }

    for handle in forwards.into_values() {
        handle.abort();
    }

    {
        let mut count = state.active_connections.write().await;
        *count = count.saturating_sub(1);
    }
}

/// Handle a parsed WebSocket message
fn handle_ws_message(
    msg: WebSocketMessage,
    state: &RealtimeState,
    event_tx: &mpsc::Sender<ChangeEvent>,
    forwards: &mut HashMap<String, JoinHandle<()>>,
) -> WebSocketMessage {
    match msg.msg_type.as_str() {
        "subscribe" => {
            let Some(topic) = msg.topic else {
                return WebSocketMessage::error("Missing topic".to_string());
            };
            match parse_topic(&topic) {
                Ok((kind, shift)) => {
                    if !forwards.contains_key(&topic) {
                        let rx = state.notifier.subscribe(kind, shift);
                        let handle = spawn_forward(rx, event_tx.clone());
                        forwards.insert(topic.clone(), handle);
                    }
                    WebSocketMessage::subscribed(topic)
                }
                Err(err) => WebSocketMessage::error(err.to_string()),
            }
        }
        "unsubscribe" => {
            let Some(topic) = msg.topic else {
                return WebSocketMessage::error("Missing topic".to_string());
            };
            match forwards.remove(&topic) {
                Some(handle) => {
                    handle.abort();
                    WebSocketMessage::unsubscribed(topic)
                }
                None => WebSocketMessage::error(format!("Not subscribed to {}", topic)),
            }
        }
        other => WebSocketMessage::error(format!("Unknown message type: {}", other)),
    }
}

/// Forwards events from a broadcast subscription into the connection's
/// outbound queue. A lagged receiver skips ahead instead of terminating.
fn spawn_forward(
    mut rx: broadcast::Receiver<ChangeEvent>,
    tx: mpsc::Sender<ChangeEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    if tx.send(event).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

async fn send_message(
    sender: &mut (impl SinkExt<Message> + Unpin),
    msg: &WebSocketMessage,
) -> bool {
    match serde_json::to_string(msg) {
        Ok(json) => sender.send(Message::Text(json)).await.is_ok(),
        Err(_) => false,
    }
}
