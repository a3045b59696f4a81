//! Chat-history REST endpoints.
//!
//! The conversation view only shows the most recent day, so the history
//! endpoint applies the 24-hour cutoff on the server side.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use chrono::{Duration, Utc};

use crate::chat::StoredMessage;
use crate::error::ApiError;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/chat/messages/{user_id1}/{user_id2}",
            get(conversation),
        )
        .route(
            "/api/chat/messages/{sender_id}/{receiver_id}/read",
            put(mark_read),
        )
        .route("/api/chat/messages/unread/{user_id}", get(unread))
}

#[utoipa::path(
    get,
    path = "/api/chat/messages/{user_id1}/{user_id2}",
    tag = "Chat",
    params(
        ("user_id1" = i64, Path, description = "One participant"),
        ("user_id2" = i64, Path, description = "The other participant"),
    ),
    responses((status = 200, description = "Messages from the last 24 hours, oldest first", body = [StoredMessage]))
)]
pub async fn conversation(
    State(state): State<AppState>,
    Path((user_id1, user_id2)): Path<(i64, i64)>,
) -> Result<Json<Vec<StoredMessage>>, ApiError> {
    let since = Utc::now().naive_utc() - Duration::hours(24);
    let messages = state.chat.messages_between(user_id1, user_id2, since).await?;
    Ok(Json(messages))
}

#[utoipa::path(
    put,
    path = "/api/chat/messages/{sender_id}/{receiver_id}/read",
    tag = "Chat",
    params(
        ("sender_id" = i64, Path, description = "Author of the messages"),
        ("receiver_id" = i64, Path, description = "Reader marking them seen"),
    ),
    responses((status = 204, description = "Messages marked read"))
)]
pub async fn mark_read(
    State(state): State<AppState>,
    Path((sender_id, receiver_id)): Path<(i64, i64)>,
) -> Result<StatusCode, ApiError> {
    state.chat.mark_read(sender_id, receiver_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/chat/messages/unread/{user_id}",
    tag = "Chat",
    params(("user_id" = i64, Path, description = "Receiver")),
    responses((status = 200, description = "Unread messages addressed to the user, oldest first", body = [StoredMessage]))
)]
pub async fn unread(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<StoredMessage>>, ApiError> {
    let messages = state.chat.unread_for(user_id).await?;
    Ok(Json(messages))
}
