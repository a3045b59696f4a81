//! Pure rules engine for the 20×20 five-in-a-row ("caro") board game.
//!
//! No I/O and no locking in here — callers serialize access per game (the
//! registry wraps each game in a per-entry mutex).

use serde::{Deserialize, Serialize};

use folio_common::id::{prefix, prefixed_ulid};

pub const BOARD_SIZE: usize = 20;

/// The four scan axes for win detection: horizontal, vertical,
/// diagonal down-right, diagonal down-left. A move completing five in
/// more than one direction reports the first axis in this order — an
/// arbitrary but fixed choice the frontend relies on.
const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

/// A player's mark on the board. Player 1 is always `X` and moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    pub fn other(self) -> Mark {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mark::X => "X",
            Mark::O => "O",
        }
    }
}

impl std::fmt::Display for Mark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Game lifecycle. Serialized in SCREAMING case (`"PLAYING"`) to match the
/// wire contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameStatus {
    Waiting,
    Playing,
    Finished,
}

/// One of the two participants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GamePlayer {
    pub id: i64,
    pub name: String,
    pub symbol: Mark,
}

/// Why a move was rejected. Rejections leave the game untouched and are not
/// surfaced on the wire (the frontend enforces the same rules locally).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveError {
    OutOfBounds,
    CellOccupied,
    NotYourTurn,
    NotPlaying,
}

pub type Board = [[Option<Mark>; BOARD_SIZE]; BOARD_SIZE];

/// A single board game between two players.
#[derive(Debug, Clone)]
pub struct Game {
    pub game_id: String,
    pub player1: GamePlayer,
    pub player2: GamePlayer,
    pub board: Board,
    pub current_turn: Mark,
    pub status: GameStatus,
    pub winner: Option<Mark>,
    pub winning_line: Vec<[usize; 2]>,
}

impl Game {
    /// Create a game between two players. Starts in `Waiting`; the registry
    /// flips it to `Playing` when the invitation is accepted.
    pub fn new(player1: GamePlayer, player2: GamePlayer) -> Self {
        Self {
            game_id: prefixed_ulid(prefix::GAME),
            player1,
            player2,
            board: [[None; BOARD_SIZE]; BOARD_SIZE],
            current_turn: Mark::X,
            status: GameStatus::Waiting,
            winner: None,
            winning_line: Vec::new(),
        }
    }

    /// The mark assigned to a participant, or `None` for a non-participant.
    pub fn mark_of(&self, user_id: i64) -> Option<Mark> {
        if self.player1.id == user_id {
            Some(self.player1.symbol)
        } else if self.player2.id == user_id {
            Some(self.player2.symbol)
        } else {
            None
        }
    }

    /// The other participant's user ID, or `None` for a non-participant.
    pub fn opponent_of(&self, user_id: i64) -> Option<i64> {
        if self.player1.id == user_id {
            Some(self.player2.id)
        } else if self.player2.id == user_id {
            Some(self.player1.id)
        } else {
            None
        }
    }

    /// Apply a move for `mark` at `(row, col)`.
    ///
    /// On success the cell is written, the win/draw condition is evaluated
    /// centered on the played cell, and either the game finishes or the turn
    /// toggles. Any constraint violation rejects the move with no state
    /// change.
    pub fn apply_move(&mut self, row: usize, col: usize, mark: Mark) -> Result<(), MoveError> {
        if self.status != GameStatus::Playing {
            return Err(MoveError::NotPlaying);
        }
        if row >= BOARD_SIZE || col >= BOARD_SIZE {
            return Err(MoveError::OutOfBounds);
        }
        if self.board[row][col].is_some() {
            return Err(MoveError::CellOccupied);
        }
        if self.current_turn != mark {
            return Err(MoveError::NotYourTurn);
        }

        self.board[row][col] = Some(mark);

        if let Some(line) = self.find_winning_line(row, col, mark) {
            self.winning_line = line;
            self.winner = Some(mark);
            self.status = GameStatus::Finished;
            return Ok(());
        }

        if self.is_full() {
            // Draw: finished with no winner.
            self.winner = None;
            self.status = GameStatus::Finished;
            return Ok(());
        }

        self.current_turn = self.current_turn.other();
        Ok(())
    }

    /// Forfeit by `leaving_user_id`: the other participant wins immediately,
    /// regardless of turn or board state.
    pub fn forfeit(&mut self, leaving_user_id: i64) {
        if self.player1.id == leaving_user_id {
            self.winner = Some(self.player2.symbol);
        } else if self.player2.id == leaving_user_id {
            self.winner = Some(self.player1.symbol);
        }
        self.status = GameStatus::Finished;
    }

    /// Scan the four axes through `(row, col)` for a contiguous run of five
    /// or more `mark` cells. Returns the run ordered from one end to the
    /// other, or `None`.
    fn find_winning_line(&self, row: usize, col: usize, mark: Mark) -> Option<Vec<[usize; 2]>> {
        for (dr, dc) in DIRECTIONS {
            let mut line = vec![[row, col]];

            // Extend in the positive direction.
            let (mut r, mut c) = (row as isize + dr, col as isize + dc);
            while in_bounds(r, c) && self.board[r as usize][c as usize] == Some(mark) {
                line.push([r as usize, c as usize]);
                r += dr;
                c += dc;
            }

            // Extend in the negative direction, prepending to keep the run
            // ordered end to end.
            let (mut r, mut c) = (row as isize - dr, col as isize - dc);
            while in_bounds(r, c) && self.board[r as usize][c as usize] == Some(mark) {
                line.insert(0, [r as usize, c as usize]);
                r -= dr;
                c -= dc;
            }

            if line.len() >= 5 {
                return Some(line);
            }
        }
        None
    }

    fn is_full(&self) -> bool {
        self.board
            .iter()
            .all(|row| row.iter().all(|cell| cell.is_some()))
    }
}

fn in_bounds(r: isize, c: isize) -> bool {
    (0..BOARD_SIZE as isize).contains(&r) && (0..BOARD_SIZE as isize).contains(&c)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playing_game() -> Game {
        let mut game = Game::new(
            GamePlayer {
                id: 1,
                name: "Alice".to_string(),
                symbol: Mark::X,
            },
            GamePlayer {
                id: 2,
                name: "Bob".to_string(),
                symbol: Mark::O,
            },
        );
        game.status = GameStatus::Playing;
        game
    }

    #[test]
    fn x_moves_first_and_turns_alternate() {
        let mut game = playing_game();
        assert_eq!(game.current_turn, Mark::X);

        game.apply_move(0, 0, Mark::X).unwrap();
        assert_eq!(game.current_turn, Mark::O);

        game.apply_move(1, 0, Mark::O).unwrap();
        assert_eq!(game.current_turn, Mark::X);
    }

    #[test]
    fn rejects_out_of_bounds() {
        let mut game = playing_game();
        assert_eq!(game.apply_move(20, 0, Mark::X), Err(MoveError::OutOfBounds));
        assert_eq!(game.apply_move(0, 20, Mark::X), Err(MoveError::OutOfBounds));
        assert_eq!(game.current_turn, Mark::X);
    }

    #[test]
    fn rejects_occupied_cell_without_state_change() {
        let mut game = playing_game();
        game.apply_move(3, 3, Mark::X).unwrap();

        let before = game.clone();
        assert_eq!(game.apply_move(3, 3, Mark::O), Err(MoveError::CellOccupied));
        assert_eq!(game.board, before.board);
        assert_eq!(game.current_turn, before.current_turn);
        assert_eq!(game.status, before.status);
    }

    #[test]
    fn rejects_move_out_of_turn() {
        let mut game = playing_game();
        assert_eq!(game.apply_move(0, 0, Mark::O), Err(MoveError::NotYourTurn));
        assert_eq!(game.board[0][0], None);
        assert_eq!(game.current_turn, Mark::X);
    }

    #[test]
    fn rejects_move_when_not_playing() {
        let mut game = playing_game();
        game.status = GameStatus::Waiting;
        assert_eq!(game.apply_move(0, 0, Mark::X), Err(MoveError::NotPlaying));

        game.status = GameStatus::Finished;
        assert_eq!(game.apply_move(0, 0, Mark::X), Err(MoveError::NotPlaying));
    }

    #[test]
    fn horizontal_five_wins_with_ordered_line() {
        let mut game = playing_game();
        // X plays (0,0)..(0,4); O plays far away on another row.
        for i in 0..4 {
            game.apply_move(0, i, Mark::X).unwrap();
            game.apply_move(10, i, Mark::O).unwrap();
        }
        game.apply_move(0, 4, Mark::X).unwrap();

        assert_eq!(game.status, GameStatus::Finished);
        assert_eq!(game.winner, Some(Mark::X));
        assert_eq!(
            game.winning_line,
            vec![[0, 0], [0, 1], [0, 2], [0, 3], [0, 4]]
        );
    }

    #[test]
    fn vertical_five_wins() {
        let mut game = playing_game();
        for i in 0..4 {
            game.apply_move(i, 0, Mark::X).unwrap();
            game.apply_move(i, 10, Mark::O).unwrap();
        }
        game.apply_move(4, 0, Mark::X).unwrap();

        assert_eq!(game.winner, Some(Mark::X));
        assert_eq!(
            game.winning_line,
            vec![[0, 0], [1, 0], [2, 0], [3, 0], [4, 0]]
        );
    }

    #[test]
    fn diagonal_down_right_five_wins() {
        let mut game = playing_game();
        for i in 0..4 {
            game.apply_move(i, i, Mark::X).unwrap();
            game.apply_move(i, 15, Mark::O).unwrap();
        }
        game.apply_move(4, 4, Mark::X).unwrap();

        assert_eq!(game.winner, Some(Mark::X));
        assert_eq!(
            game.winning_line,
            vec![[0, 0], [1, 1], [2, 2], [3, 3], [4, 4]]
        );
    }

    #[test]
    fn diagonal_down_left_five_wins() {
        let mut game = playing_game();
        for i in 0..4 {
            game.apply_move(i, 10 - i, Mark::X).unwrap();
            game.apply_move(i, 15, Mark::O).unwrap();
        }
        game.apply_move(4, 6, Mark::X).unwrap();

        assert_eq!(game.winner, Some(Mark::X));
        assert_eq!(
            game.winning_line,
            vec![[0, 10], [1, 9], [2, 8], [3, 7], [4, 6]]
        );
    }

    #[test]
    fn win_detected_mid_line_keeps_end_to_end_order() {
        let mut game = playing_game();
        // X fills (5,0),(5,1),(5,3),(5,4) then closes the gap at (5,2).
        for col in [0usize, 1, 3, 4] {
            game.apply_move(5, col, Mark::X).unwrap();
            game.apply_move(12, col, Mark::O).unwrap();
        }
        game.apply_move(5, 2, Mark::X).unwrap();

        assert_eq!(game.winner, Some(Mark::X));
        assert_eq!(
            game.winning_line,
            vec![[5, 0], [5, 1], [5, 2], [5, 3], [5, 4]]
        );
    }

    #[test]
    fn run_longer_than_five_is_reported_whole() {
        let mut game = playing_game();
        // X builds (2,0),(2,1),(2,2),(2,4),(2,5) then bridges at (2,3): a
        // six-cell run.
        for col in [0usize, 1, 2, 4, 5] {
            game.apply_move(2, col, Mark::X).unwrap();
            game.apply_move(14, col, Mark::O).unwrap();
        }
        game.apply_move(2, 3, Mark::X).unwrap();

        assert_eq!(game.winner, Some(Mark::X));
        assert_eq!(game.winning_line.len(), 6);
        assert_eq!(game.winning_line.first(), Some(&[2, 0]));
        assert_eq!(game.winning_line.last(), Some(&[2, 5]));
    }

    #[test]
    fn four_in_a_row_does_not_finish() {
        let mut game = playing_game();
        for i in 0..4 {
            game.apply_move(0, i, Mark::X).unwrap();
            game.apply_move(10, i, Mark::O).unwrap();
        }
        assert_eq!(game.status, GameStatus::Playing);
        assert_eq!(game.winner, None);
    }

    #[test]
    fn full_board_without_a_run_is_a_draw() {
        // Tiling with two-cell blocks shifted by two every other row: no
        // five-in-a-row exists in any direction, and each mark covers
        // exactly 200 cells.
        let cell = |r: usize, c: usize| {
            if (c + 2 * (r % 2)) % 4 < 2 {
                Mark::X
            } else {
                Mark::O
            }
        };

        let mut xs = Vec::new();
        let mut os = Vec::new();
        for r in 0..BOARD_SIZE {
            for c in 0..BOARD_SIZE {
                match cell(r, c) {
                    Mark::X => xs.push((r, c)),
                    Mark::O => os.push((r, c)),
                }
            }
        }
        assert_eq!(xs.len(), 200);
        assert_eq!(os.len(), 200);

        // Any mid-game subset of the final placement contains no run either,
        // so interleaving the two lists is a legal full playout.
        let mut game = playing_game();
        for (&(xr, xc), &(or, oc)) in xs.iter().zip(os.iter()) {
            game.apply_move(xr, xc, Mark::X).unwrap();
            game.apply_move(or, oc, Mark::O).unwrap();
        }

        assert_eq!(game.status, GameStatus::Finished);
        assert_eq!(game.winner, None);
        assert!(game.winning_line.is_empty());
    }

    #[test]
    fn forfeit_awards_the_other_mark() {
        let mut game = playing_game();
        game.forfeit(1);
        assert_eq!(game.status, GameStatus::Finished);
        assert_eq!(game.winner, Some(Mark::O));

        let mut game = playing_game();
        game.forfeit(2);
        assert_eq!(game.winner, Some(Mark::X));
    }

    #[test]
    fn mark_and_opponent_lookups() {
        let game = playing_game();
        assert_eq!(game.mark_of(1), Some(Mark::X));
        assert_eq!(game.mark_of(2), Some(Mark::O));
        assert_eq!(game.mark_of(99), None);
        assert_eq!(game.opponent_of(1), Some(2));
        assert_eq!(game.opponent_of(2), Some(1));
        assert_eq!(game.opponent_of(99), None);
    }
}
