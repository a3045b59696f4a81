//! Lifecycle and lookup for active games and invitations.
//!
//! Single authority for the user↔game mapping. Uses `DashMap` for
//! shard-level concurrency and `parking_lot::Mutex` per game entry, so
//! accept/move/quit on one game are serialized while other games proceed
//! in parallel. Every operation returns a cloned snapshot; no lock is held
//! once a method returns.

use dashmap::DashMap;
use parking_lot::Mutex;

use super::board::{Game, GamePlayer, GameStatus, Mark};

pub struct GameRegistry {
    /// Active games keyed by game ID.
    games: DashMap<String, Mutex<Game>>,
    /// Pending invitations: game ID → inviter user ID.
    invitations: DashMap<String, i64>,
    /// Each user's current game while one is in progress.
    current_game: DashMap<i64, String>,
}

impl GameRegistry {
    pub fn new() -> Self {
        Self {
            games: DashMap::new(),
            invitations: DashMap::new(),
            current_game: DashMap::new(),
        }
    }

    /// Create a `Waiting` game and record the pending invitation. The caller
    /// notifies the invited user out-of-band.
    pub fn create_invitation(
        &self,
        inviter_id: i64,
        inviter_name: &str,
        invited_id: i64,
        invited_name: &str,
    ) -> Game {
        let game = Game::new(
            GamePlayer {
                id: inviter_id,
                name: inviter_name.to_string(),
                symbol: Mark::X,
            },
            GamePlayer {
                id: invited_id,
                name: invited_name.to_string(),
                symbol: Mark::O,
            },
        );

        let snapshot = game.clone();
        self.invitations.insert(game.game_id.clone(), inviter_id);
        self.games.insert(game.game_id.clone(), Mutex::new(game));
        snapshot
    }

    /// Move a `Waiting` game to `Playing` and register both participants'
    /// current game. Returns `None` for an unknown game or a non-participant.
    pub fn accept_invitation(&self, game_id: &str, user_id: i64) -> Option<Game> {
        let snapshot = {
            let entry = self.games.get(game_id)?;
            let mut game = entry.lock();

            game.mark_of(user_id)?;

            game.status = GameStatus::Playing;
            game.clone()
        };

        self.invitations.remove(game_id);
        self.current_game
            .insert(snapshot.player1.id, game_id.to_string());
        self.current_game
            .insert(snapshot.player2.id, game_id.to_string());

        Some(snapshot)
    }

    /// Drop a pending game and its invitation record. No ownership check
    /// beyond existence; calling this twice is a safe no-op.
    pub fn decline_invitation(&self, game_id: &str, _user_id: i64) {
        self.remove_game(game_id);
    }

    /// Drop a game record outright, e.g. the finished game once a rematch
    /// replaces it.
    pub fn remove_game(&self, game_id: &str) {
        self.games.remove(game_id);
        self.invitations.remove(game_id);
    }

    /// Apply a move on behalf of `user_id`. Returns the updated snapshot, or
    /// `None` if the game is unknown, the user is not a participant, or the
    /// engine rejected the move. When the move finishes the game, both
    /// participants leave the current-game map; the record itself stays
    /// until quit/rematch removes it.
    pub fn apply_move(&self, game_id: &str, user_id: i64, row: usize, col: usize) -> Option<Game> {
        let snapshot = {
            let entry = self.games.get(game_id)?;
            let mut game = entry.lock();

            let mark = game.mark_of(user_id)?;
            if let Err(reason) = game.apply_move(row, col, mark) {
                tracing::debug!(game_id, user_id, row, col, ?reason, "move rejected");
                return None;
            }
            game.clone()
        };

        if snapshot.status == GameStatus::Finished {
            self.current_game.remove(&snapshot.player1.id);
            self.current_game.remove(&snapshot.player2.id);
        }

        Some(snapshot)
    }

    /// Forfeit on behalf of `user_id` and remove the game entirely. Returns
    /// the finished snapshot so the caller can notify the opponent.
    pub fn quit(&self, game_id: &str, user_id: i64) -> Option<Game> {
        let snapshot = {
            let entry = self.games.get(game_id)?;
            let mut game = entry.lock();
            game.forfeit(user_id);
            game.clone()
        };

        self.games.remove(game_id);
        self.invitations.remove(game_id);
        self.current_game.remove(&snapshot.player1.id);
        self.current_game.remove(&snapshot.player2.id);

        Some(snapshot)
    }

    /// Forfeit the user's current game, if any, as `quit` would.
    pub fn handle_disconnect(&self, user_id: i64) -> Option<Game> {
        let game_id = self.current_game.get(&user_id).map(|id| id.value().clone())?;
        self.quit(&game_id, user_id)
    }

    pub fn get_game(&self, game_id: &str) -> Option<Game> {
        self.games.get(game_id).map(|entry| entry.lock().clone())
    }

    pub fn current_game_of(&self, user_id: i64) -> Option<String> {
        self.current_game.get(&user_id).map(|id| id.value().clone())
    }

    pub fn is_user_in_game(&self, user_id: i64) -> bool {
        self.current_game.contains_key(&user_id)
    }

    /// The other participant of a game, or `None` if the game or user is
    /// unknown.
    pub fn opponent_of(&self, game_id: &str, user_id: i64) -> Option<i64> {
        let entry = self.games.get(game_id)?;
        let game = entry.lock();
        game.opponent_of(user_id)
    }

    pub fn pending_inviter(&self, game_id: &str) -> Option<i64> {
        self.invitations.get(game_id).map(|id| *id)
    }
}

impl Default for GameRegistry {
    fn default() -> Self {
        Self::new()
    }
}
