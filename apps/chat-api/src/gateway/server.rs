//! WebSocket upgrade handler and per-connection event loop.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;

use folio_common::{prefix, prefixed_ulid};

use crate::error::ApiError;
use crate::AppState;

use super::events::{self, ClientEvent};
use super::handler;

#[derive(Debug, Deserialize)]
struct ConnectParams {
    #[serde(rename = "userId")]
    user_id: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/ws", get(ws_upgrade))
}

/// `GET /ws?userId=<id>`. The user ID is validated before the upgrade so a
/// bad request fails the HTTP handshake instead of opening a socket that
/// closes immediately.
async fn ws_upgrade(
    ws: WebSocketUpgrade,
    Query(params): Query<ConnectParams>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = params
        .user_id
        .as_deref()
        .and_then(|raw| raw.parse::<i64>().ok())
        .ok_or_else(|| ApiError::bad_request("userId query parameter is required"))?;

    Ok(ws.on_upgrade(move |socket| handle_connection(socket, state, user_id)))
}

async fn handle_connection(socket: WebSocket, state: AppState, user_id: i64) {
    let conn_id = prefixed_ulid(prefix::CONNECTION);
    let (mut ws_tx, mut ws_rx) = socket.split();

    // Register the outbound queue first so nothing fanned out during setup
    // is lost. A second connection for the same user evicts the first.
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    if let Some(evicted) = state.connections.register(&conn_id, user_id, tx) {
        tracing::debug!(user_id, old_conn = %evicted, "replaced existing connection");
    }

    let user = state.presence.mark_online(user_id).await;
    tracing::info!(user_id, conn_id = %conn_id, "websocket connected");

    // Snapshot to the new connection, join notice to everyone else.
    state
        .connections
        .send_to_user(user_id, &events::online_users(&state.presence.snapshot()).to_string());
    state
        .connections
        .broadcast_except(user_id, &events::user_joined(&user).to_string());

    loop {
        tokio::select! {
            // Client sends us a message.
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let event: ClientEvent = match serde_json::from_str(&text) {
                            Ok(event) => event,
                            Err(err) => {
                                tracing::warn!(user_id, %err, "dropping malformed event");
                                continue;
                            }
                        };
                        handler::dispatch(&state, user_id, event).await;
                    }
                    Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(err)) => {
                        tracing::debug!(user_id, ?err, "ws read error");
                        break;
                    }
                    _ => continue,
                }
            }

            // Outbound event queued for this user.
            payload = rx.recv() => {
                match payload {
                    Some(payload) => {
                        if ws_tx.send(Message::Text(payload.into())).await.is_err() {
                            break;
                        }
                    }
                    // Queue closed: this connection was evicted by a newer one.
                    None => break,
                }
            }
        }
    }

    // An evicted connection was already unregistered by its replacement, and
    // the user is still online there, so only the surviving registration
    // runs the offline cleanup.
    if state.connections.unregister(&conn_id) {
        if let Some(game) = state.games.handle_disconnect(user_id) {
            state.matches.forget(&game.game_id);
            if let Some(opponent_id) = game.opponent_of(user_id) {
                let payload = events::game_end_forfeit(&game).to_string();
                state.connections.send_to_user(opponent_id, &payload);
            }
            tracing::info!(user_id, game_id = %game.game_id, "game forfeited on disconnect");
        }

        state.presence.mark_offline(user_id);
        state
            .connections
            .broadcast_except(user_id, &events::user_left(user_id).to_string());
    }

    tracing::info!(user_id, conn_id = %conn_id, "websocket disconnected");
}
