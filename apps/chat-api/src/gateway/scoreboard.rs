//! Per-match bookkeeping that outlives individual games: running win/draw
//! counts and rematch negotiation state, both keyed by game ID.

use std::collections::HashSet;

use dashmap::DashMap;
use serde::Serialize;

use crate::game::board::Mark;

/// Running result counts for a series of games between the same pair.
/// Player 1 is always "X", so results are tallied by mark.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scoreboard {
    pub player1_wins: u32,
    pub player2_wins: u32,
    pub draws: u32,
}

pub struct MatchTracker {
    scoreboards: DashMap<String, Scoreboard>,
    rematch_requests: DashMap<String, HashSet<i64>>,
}

impl MatchTracker {
    pub fn new() -> Self {
        Self {
            scoreboards: DashMap::new(),
            rematch_requests: DashMap::new(),
        }
    }

    /// Get the scoreboard for a game, creating an all-zero one if absent.
    pub fn ensure_scoreboard(&self, game_id: &str) -> Scoreboard {
        self.scoreboards
            .entry(game_id.to_string())
            .or_default()
            .clone()
    }

    /// Tally a finished game and return the updated scoreboard.
    pub fn record_result(&self, game_id: &str, winner: Option<Mark>) -> Scoreboard {
        let mut entry = self.scoreboards.entry(game_id.to_string()).or_default();
        match winner {
            Some(Mark::X) => entry.player1_wins += 1,
            Some(Mark::O) => entry.player2_wins += 1,
            None => entry.draws += 1,
        }
        entry.clone()
    }

    /// Copy a match's scoreboard under the rematch's new game ID and return
    /// it.
    pub fn carry_forward(&self, old_game_id: &str, new_game_id: &str) -> Scoreboard {
        let scoreboard = self.ensure_scoreboard(old_game_id);
        self.scoreboards
            .insert(new_game_id.to_string(), scoreboard.clone());
        scoreboard
    }

    /// Record that a user asked to replay this game.
    pub fn request_rematch(&self, game_id: &str, user_id: i64) {
        self.rematch_requests
            .entry(game_id.to_string())
            .or_default()
            .insert(user_id);
    }

    /// Whether both participants have asked to replay.
    pub fn both_requested(&self, game_id: &str, user_a: i64, user_b: i64) -> bool {
        self.rematch_requests
            .get(game_id)
            .map(|set| set.contains(&user_a) && set.contains(&user_b))
            .unwrap_or(false)
    }

    /// Drop all bookkeeping for a match that is over: quit, disconnect, or
    /// replaced by a rematch.
    pub fn forget(&self, game_id: &str) {
        self.scoreboards.remove(game_id);
        self.rematch_requests.remove(game_id);
    }
}

impl Default for MatchTracker {
    fn default() -> Self {
        Self::new()
    }
}
