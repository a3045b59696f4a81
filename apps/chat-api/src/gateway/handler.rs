//! Inbound event dispatch: chat routing, game lifecycle, and rematch
//! negotiation.
//!
//! Everything here is best-effort toward the wire: validation and
//! not-found failures are logged and produce no outbound event (the
//! frontend enforces the same rules locally), and collaborator failures
//! never surface to the connection.

use crate::game::board::GameStatus;
use crate::gateway::events::{self, ClientEvent, MovePayload};
use crate::AppState;

pub async fn dispatch(state: &AppState, sender_id: i64, event: ClientEvent) {
    match event {
        ClientEvent::Join { user_id } => handle_join(state, sender_id, user_id).await,
        ClientEvent::ChatMessage {
            receiver_id,
            message,
        } => handle_chat_message(state, sender_id, receiver_id, &message).await,
        ClientEvent::SendGameInvitation { data } => {
            handle_send_invitation(state, sender_id, data.to_user_id)
        }
        ClientEvent::AcceptGameInvitation { data } => {
            handle_accept_invitation(state, sender_id, &data.game_id)
        }
        ClientEvent::DeclineGameInvitation { data } => {
            handle_decline_invitation(state, sender_id, &data.game_id)
        }
        ClientEvent::GameMove { data } => handle_game_move(state, sender_id, &data),
        ClientEvent::QuitGame { data } => handle_quit_game(state, sender_id, &data.game_id),
        ClientEvent::PlayAgainRequest { data } => {
            handle_play_again(state, sender_id, &data.game_id)
        }
    }
}

/// Re-register presence and send the online-users snapshot back to the
/// sender.
async fn handle_join(state: &AppState, sender_id: i64, user_id: i64) {
    state.presence.mark_online(user_id).await;
    let snapshot = events::online_users(&state.presence.snapshot());
    state.connections.send_to_user(sender_id, &snapshot.to_string());
}

/// Persist a direct message, deliver it to the receiver if online, and echo
/// the stored copy back to the sender as delivery confirmation.
async fn handle_chat_message(state: &AppState, sender_id: i64, receiver_id: i64, message: &str) {
    if message.trim().is_empty() {
        return;
    }

    let stored = match state.chat.save(sender_id, receiver_id, message).await {
        Ok(stored) => stored,
        Err(err) => {
            tracing::warn!(sender_id, receiver_id, ?err, "failed to persist chat message");
            return;
        }
    };

    let payload = events::chat_message(&stored).to_string();
    if !state.connections.send_to_user(receiver_id, &payload) {
        tracing::debug!(receiver_id, "receiver offline, message stored only");
    }
    state.connections.send_to_user(sender_id, &payload);

    tracing::info!(sender_id, receiver_id, "chat message routed");
}

/// Create an invitation and deliver it to the invited user. Silently
/// dropped unless both parties are online.
fn handle_send_invitation(state: &AppState, inviter_id: i64, invited_id: i64) {
    let (Some(inviter), Some(invited)) =
        (state.presence.get(inviter_id), state.presence.get(invited_id))
    else {
        tracing::debug!(inviter_id, invited_id, "invitation dropped, party offline");
        return;
    };

    let game = state
        .games
        .create_invitation(inviter_id, &inviter.name, invited_id, &invited.name);

    let payload = events::game_invitation(&game).to_string();
    state.connections.send_to_user(invited_id, &payload);

    tracing::info!(inviter_id, invited_id, game_id = %game.game_id, "game invitation sent");
}

fn handle_accept_invitation(state: &AppState, user_id: i64, game_id: &str) {
    let Some(game) = state.games.accept_invitation(game_id, user_id) else {
        tracing::debug!(user_id, game_id, "accept ignored, unknown game or non-participant");
        return;
    };

    let scoreboard = state.matches.ensure_scoreboard(game_id);
    let payload = events::game_start(&game, &scoreboard).to_string();
    state.connections.send_to_user(game.player1.id, &payload);
    state.connections.send_to_user(game.player2.id, &payload);

    tracing::info!(
        game_id,
        player1 = game.player1.id,
        player2 = game.player2.id,
        "game started"
    );
}

fn handle_decline_invitation(state: &AppState, user_id: i64, game_id: &str) {
    state.games.decline_invitation(game_id, user_id);
    tracing::info!(user_id, game_id, "game invitation declined");
}

/// Apply a move and fan the updated board out to both participants. A
/// finishing move additionally updates the scoreboard and fans out the
/// game-end envelope.
fn handle_game_move(state: &AppState, user_id: i64, payload: &MovePayload) {
    let Some(game) = state
        .games
        .apply_move(&payload.game_id, user_id, payload.row, payload.col)
    else {
        return;
    };

    let move_payload = events::game_move(&game, payload.row, payload.col).to_string();
    state.connections.send_to_user(game.player1.id, &move_payload);
    state.connections.send_to_user(game.player2.id, &move_payload);

    if game.status == GameStatus::Finished {
        let scoreboard = state.matches.record_result(&game.game_id, game.winner);
        let end_payload = events::game_end(&game, &scoreboard).to_string();
        state.connections.send_to_user(game.player1.id, &end_payload);
        state.connections.send_to_user(game.player2.id, &end_payload);
    }
}

fn handle_quit_game(state: &AppState, user_id: i64, game_id: &str) {
    let Some(game) = state.games.quit(game_id, user_id) else {
        tracing::debug!(user_id, game_id, "quit ignored, unknown game");
        return;
    };

    state.matches.forget(game_id);

    if let Some(opponent_id) = game.opponent_of(user_id) {
        let payload = events::game_end_forfeit(&game).to_string();
        state.connections.send_to_user(opponent_id, &payload);
    }

    tracing::info!(user_id, game_id, "user quit game");
}

/// Record the rematch request. When both participants have asked, start a
/// fresh game carrying the scoreboard forward; otherwise forward the
/// request to the opponent.
fn handle_play_again(state: &AppState, user_id: i64, game_id: &str) {
    state.matches.request_rematch(game_id, user_id);

    let Some(opponent_id) = state.games.opponent_of(game_id, user_id) else {
        tracing::debug!(user_id, game_id, "rematch request ignored, unknown game");
        return;
    };

    if !state.matches.both_requested(game_id, user_id, opponent_id) {
        let payload = events::play_again_request(game_id, user_id).to_string();
        state.connections.send_to_user(opponent_id, &payload);
        return;
    }

    // Both agreed. The second requester becomes player 1 ("X") of the new
    // game; the frontend relies on this ordering.
    let (Some(requester), Some(opponent)) =
        (state.presence.get(user_id), state.presence.get(opponent_id))
    else {
        tracing::debug!(user_id, opponent_id, "rematch dropped, party offline");
        return;
    };

    let new_game =
        state
            .games
            .create_invitation(user_id, &requester.name, opponent_id, &opponent.name);
    let Some(started) = state.games.accept_invitation(&new_game.game_id, opponent_id) else {
        return;
    };

    let scoreboard = state.matches.carry_forward(game_id, &started.game_id);
    state.matches.forget(game_id);
    state.games.remove_game(game_id);

    let payload = events::game_start(&started, &scoreboard).to_string();
    state.connections.send_to_user(started.player1.id, &payload);
    state.connections.send_to_user(started.player2.id, &payload);

    tracing::info!(
        old_game = game_id,
        new_game = %started.game_id,
        "rematch started"
    );
}
