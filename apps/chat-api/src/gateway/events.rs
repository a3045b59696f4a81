//! Wire-format events for the chat/game WebSocket.
//!
//! Field names (and their inconsistencies — `userId` integers, `gameId`
//! strings, a `data` wrapper on game events but not on chat events) are the
//! compatibility surface with the existing frontend and must not change.

use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::chat::StoredMessage;
use crate::game::board::Game;
use crate::gateway::presence::OnlineUser;
use crate::gateway::scoreboard::Scoreboard;

// ---------------------------------------------------------------------------
// Client → server events
// ---------------------------------------------------------------------------

/// Every inbound event the gateway understands. Unknown `type` tags fail to
/// decode and are dropped by the connection loop.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    Join {
        #[serde(rename = "userId")]
        user_id: i64,
    },
    ChatMessage {
        #[serde(rename = "receiverId")]
        receiver_id: i64,
        message: String,
    },
    SendGameInvitation {
        data: InvitationPayload,
    },
    AcceptGameInvitation {
        data: GameRef,
    },
    DeclineGameInvitation {
        data: GameRef,
    },
    GameMove {
        data: MovePayload,
    },
    QuitGame {
        data: GameRef,
    },
    PlayAgainRequest {
        data: GameRef,
    },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvitationPayload {
    pub to_user_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRef {
    pub game_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovePayload {
    pub game_id: String,
    pub row: usize,
    pub col: usize,
}

// ---------------------------------------------------------------------------
// Server → client envelopes
// ---------------------------------------------------------------------------

pub fn online_users(users: &[OnlineUser]) -> Value {
    json!({
        "type": "online_users",
        "users": users,
    })
}

pub fn user_joined(user: &OnlineUser) -> Value {
    json!({
        "type": "user_joined",
        "user": user,
    })
}

pub fn user_left(user_id: i64) -> Value {
    json!({
        "type": "user_left",
        "userId": user_id,
    })
}

pub fn chat_message(message: &StoredMessage) -> Value {
    json!({
        "type": "chat_message",
        "message": {
            "id": message.id,
            "senderId": message.sender_id,
            "receiverId": message.receiver_id,
            "message": message.message,
            "timestamp": message.timestamp,
            "read": message.is_read,
        },
    })
}

pub fn game_invitation(game: &Game) -> Value {
    json!({
        "type": "game_invitation",
        "data": {
            "gameId": game.game_id,
            "fromUser": {
                "id": game.player1.id,
                "name": game.player1.name,
            },
            "toUser": {
                "id": game.player2.id,
                "name": game.player2.name,
            },
            "timestamp": Utc::now().naive_utc(),
        },
    })
}

pub fn game_start(game: &Game, scoreboard: &Scoreboard) -> Value {
    json!({
        "type": "game_start",
        "data": {
            "gameId": game.game_id,
            "currentPlayer": game.current_turn,
            "players": {
                "player1": game.player1,
                "player2": game.player2,
            },
            "scoreboard": scoreboard,
        },
    })
}

pub fn game_move(game: &Game, row: usize, col: usize) -> Value {
    json!({
        "type": "game_move",
        "data": {
            "gameId": game.game_id,
            "board": game.board,
            "currentPlayer": game.current_turn,
            "status": game.status,
            "winner": game.winner,
            "winningLine": game.winning_line,
            "lastMove": { "row": row, "col": col },
        },
    })
}

/// Game finished on the board: win or draw, with the updated scoreboard.
pub fn game_end(game: &Game, scoreboard: &Scoreboard) -> Value {
    json!({
        "type": "game_end",
        "data": {
            "gameId": game.game_id,
            "winner": game.winner,
            "winningLine": game.winning_line,
            "status": "finished",
            "scoreboard": scoreboard,
        },
    })
}

/// Game finished because the opponent quit or disconnected.
pub fn game_end_forfeit(game: &Game) -> Value {
    json!({
        "type": "game_end",
        "data": {
            "winner": game.winner,
            "reason": "opponent_quit",
        },
    })
}

pub fn play_again_request(game_id: &str, requester_user_id: i64) -> Value {
    json!({
        "type": "play_again_request",
        "data": {
            "gameId": game_id,
            "requesterUserId": requester_user_id,
        },
    })
}
