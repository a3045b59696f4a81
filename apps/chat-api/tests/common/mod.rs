#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::time;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use chat_api::chat::{ChatStore, MemoryChatStore};
use chat_api::config::Config;
use chat_api::game::registry::GameRegistry;
use chat_api::gateway::connections::ConnectionRegistry;
use chat_api::gateway::presence::PresenceRegistry;
use chat_api::gateway::scoreboard::MatchTracker;
use chat_api::profile::ProfileClient;
use chat_api::AppState;

pub type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// App state with an in-memory message store and an unreachable auth
/// service, so presence falls back to placeholder profiles ("User <id>").
pub fn test_state() -> AppState {
    let profiles = Arc::new(ProfileClient::new("http://127.0.0.1:9"));
    let chat: Arc<dyn ChatStore> = Arc::new(MemoryChatStore::new());
    AppState {
        config: Arc::new(Config {
            auth_service_url: "http://127.0.0.1:9".to_string(),
            port: 0,
        }),
        chat,
        presence: Arc::new(PresenceRegistry::new(profiles)),
        games: Arc::new(GameRegistry::new()),
        matches: Arc::new(MatchTracker::new()),
        connections: Arc::new(ConnectionRegistry::new()),
    }
}

/// Start an actual TCP server for WebSocket testing. Returns (addr, state);
/// the server runs in the background.
pub async fn start_server() -> (SocketAddr, AppState) {
    let state = test_state();
    let app = chat_api::routes::router().with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, state)
}

/// Connect a WebSocket client for the given user.
pub async fn connect(addr: SocketAddr, user_id: i64) -> WsClient {
    let url = format!("ws://{addr}/ws?userId={user_id}");
    let (ws_stream, _) = tokio_tungstenite::connect_async(&url)
        .await
        .expect("ws connect");
    ws_stream
}

pub async fn send_json(ws: &mut WsClient, value: serde_json::Value) {
    ws.send(Message::Text(value.to_string().into()))
        .await
        .expect("ws send");
}

/// Read the next text frame and parse it as JSON.
pub async fn recv_json(ws: &mut WsClient) -> serde_json::Value {
    loop {
        let msg = time::timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timeout waiting for event")
            .expect("stream ended")
            .expect("ws read error");

        match msg {
            Message::Text(text) => return serde_json::from_str(&text).expect("parse event"),
            // tungstenite answers pings itself; skip control frames.
            Message::Ping(_) | Message::Pong(_) => continue,
            other => panic!("unexpected frame: {other:?}"),
        }
    }
}

/// Read events until one with the given `type`, skipping everything else
/// (presence notices arrive interleaved with game events).
pub async fn recv_event(ws: &mut WsClient, event_type: &str) -> serde_json::Value {
    for _ in 0..20 {
        let event = recv_json(ws).await;
        if event["type"] == event_type {
            return event;
        }
    }
    panic!("no {event_type} event within 20 frames");
}
