//! Match state documents persisted to the match and archive stores.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// FEN of the standard chess starting position.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// A chess color; used both for the side the crowd controls and for the side
/// to move in a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    /// White pieces.
    White,
    /// Black pieces.
    Black,
}

impl Color {
    /// The opposing color.
    pub fn other(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::White => write!(f, "white"),
            Self::Black => write!(f, "black"),
        }
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "white" => Ok(Self::White),
            "black" => Ok(Self::Black),
            other => Err(format!("unknown color '{other}', expected white or black")),
        }
    }
}

/// Which side won a finished match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    /// The voting crowd delivered mate.
    Crowd,
    /// The automated opponent delivered mate.
    Opponent,
}

/// Creation parameters for a match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchSpec {
    /// Unique match name, stable across reset cycles.
    pub name: String,
    /// Length of one voting round in seconds.
    pub round_period: u64,
    /// Seconds granted to the opponent oracle per reply; doubles as the
    /// grace window before round closure.
    pub opponent_time_budget: u64,
    /// The color the crowd controls.
    pub crowd_color: Color,
    /// Optional length of the very first round in seconds; defaults to
    /// `round_period`.
    pub first_round: Option<u64>,
}

/// One live crowd-vs-machine match, serialized as a flat document keyed by
/// its name in the match state store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChessMatch {
    /// Unique match name.
    pub name: String,
    /// Length of one voting round in seconds.
    pub round_period: u64,
    /// Absolute UNIX timestamp (milliseconds) at which the current round
    /// closes.
    pub next_resolution_at: i64,
    /// The color the crowd controls; the opponent oracle plays the other.
    pub crowd_color: Color,
    /// Current board position in FEN.
    pub position: String,
    /// All committed moves (crowd and opponent) in UCI, append-only.
    pub move_history: Vec<String>,
    /// For each historical position a round was resolved from, the vote
    /// distribution that decided it. Kept for display and audit.
    pub tally_snapshots: HashMap<String, Vec<(String, u64)>>,
    /// True once a terminal position has been reached.
    pub is_finished: bool,
    /// Set when `is_finished`; the side that delivered mate.
    pub winner: Option<Winner>,
    /// Seconds granted to the opponent oracle per reply.
    pub opponent_time_budget: u64,
    /// Creation time, UNIX milliseconds.
    pub created_at: i64,
    /// Last mutation time, UNIX milliseconds.
    pub updated_at: i64,
}

/// Tally store key for a match name and position pair.
pub fn voting_key(name: &str, fen: &str) -> String {
    format!("{name}:{fen}")
}

impl ChessMatch {
    /// Builds a fresh match at the standard starting position.
    pub fn new(spec: &MatchSpec, now_ms: i64) -> Self {
        let first = spec.first_round.unwrap_or(spec.round_period);
        Self {
            name: spec.name.clone(),
            round_period: spec.round_period,
            next_resolution_at: now_ms + (first as i64) * 1000,
            crowd_color: spec.crowd_color,
            position: STARTING_FEN.to_string(),
            move_history: Vec::new(),
            tally_snapshots: HashMap::new(),
            is_finished: false,
            winner: None,
            opponent_time_budget: spec.opponent_time_budget,
            created_at: now_ms,
            updated_at: now_ms,
        }
    }

    /// Tally store key for the round currently collecting votes.
    pub fn voting_key(&self) -> String {
        voting_key(&self.name, &self.position)
    }

    /// Whole seconds until the current round closes; negative once the
    /// deadline has passed.
    pub fn seconds_remaining(&self, now_ms: i64) -> i64 {
        (self.next_resolution_at - now_ms) / 1000
    }

    /// True once the round is inside its grace window: resolution is
    /// attempted `opponent_time_budget` seconds before the nominal deadline
    /// so the opponent reply can complete within the round.
    pub fn is_due(&self, now_ms: i64) -> bool {
        self.seconds_remaining(now_ms) <= self.opponent_time_budget as i64
    }

    /// Starts the next round's timer from `now_ms`.
    pub fn restart_round(&mut self, now_ms: i64) {
        self.next_resolution_at = now_ms + (self.round_period as i64) * 1000;
        self.updated_at = now_ms;
    }

    /// Reinitializes the match in place for a new cycle, keeping its name
    /// and configuration.
    pub fn reset(&mut self, now_ms: i64) {
        self.position = STARTING_FEN.to_string();
        self.move_history.clear();
        self.tally_snapshots.clear();
        self.is_finished = false;
        self.winner = None;
        self.restart_round(now_ms);
    }
}

/// Immutable copy of a finished match, written once to the archive store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchivedMatch {
    /// The full match record as it stood when archived.
    #[serde(flatten)]
    pub record: ChessMatch,
    /// When the record was archived, UNIX milliseconds.
    pub archived_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> MatchSpec {
        MatchSpec {
            name: "Daily".to_string(),
            round_period: 60,
            opponent_time_budget: 5,
            crowd_color: Color::White,
            first_round: None,
        }
    }

    #[test]
    fn new_match_starts_at_initial_position() {
        let m = ChessMatch::new(&spec(), 1_000);
        assert_eq!(m.position, STARTING_FEN);
        assert_eq!(m.next_resolution_at, 1_000 + 60_000);
        assert!(m.move_history.is_empty());
        assert!(!m.is_finished);
        assert!(m.winner.is_none());
    }

    #[test]
    fn first_round_override_shortens_initial_window() {
        let mut s = spec();
        s.first_round = Some(30);
        let m = ChessMatch::new(&s, 0);
        assert_eq!(m.next_resolution_at, 30_000);
    }

    #[test]
    fn due_inside_grace_window_only() {
        let m = ChessMatch::new(&spec(), 0);
        // 60s round, 5s budget: due once 55s have elapsed.
        assert!(!m.is_due(54_000));
        assert!(m.is_due(55_000));
        assert!(m.is_due(120_000));
    }

    #[test]
    fn reset_clears_history_but_keeps_configuration() {
        let mut m = ChessMatch::new(&spec(), 0);
        m.move_history.push("e2e4".to_string());
        m.tally_snapshots
            .insert(STARTING_FEN.to_string(), vec![("e2e4".to_string(), 3)]);
        m.is_finished = true;
        m.winner = Some(Winner::Crowd);

        m.reset(500_000);

        assert_eq!(m.position, STARTING_FEN);
        assert!(m.move_history.is_empty());
        assert!(m.tally_snapshots.is_empty());
        assert!(!m.is_finished);
        assert!(m.winner.is_none());
        assert_eq!(m.name, "Daily");
        assert_eq!(m.round_period, 60);
        assert_eq!(m.next_resolution_at, 500_000 + 60_000);
    }
}
