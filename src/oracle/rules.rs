//! Rules oracle: move validation, legal move enumeration, and board
//! advancement backed by `shakmaty`.

use crate::error::EngineError;
use crate::model::Color;
use shakmaty::fen::Fen;
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Chess, EnPassantMode, Position};
use tracing::debug;

/// Result of applying one move to a position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    /// The position after the move, in FEN.
    pub position: String,
    /// Whose turn it is in the new position.
    pub side_to_move: Color,
    /// True if the new position is checkmate (the side to move is mated).
    pub checkmate: bool,
}

/// Validates moves against a position and advances the board.
///
/// Implementations are pure position algebra; all match bookkeeping stays in
/// the engine.
pub trait RulesOracle: Send + Sync {
    /// Checks that `mv` parses as UCI, is legal in `fen`, and that it is the
    /// crowd's turn. All three failure modes report as
    /// [`EngineError::IllegalMove`]; callers cannot tell them apart.
    fn validate(&self, fen: &str, mv: &str, crowd_color: Color) -> Result<(), EngineError>;

    /// Every legal move in `fen`, in UCI.
    fn legal_moves(&self, fen: &str) -> Result<Vec<String>, EngineError>;

    /// Applies `mv` to `fen`, returning the resulting position.
    fn apply(&self, fen: &str, mv: &str) -> Result<MoveOutcome, EngineError>;

    /// Whose turn it is in `fen`.
    fn side_to_move(&self, fen: &str) -> Result<Color, EngineError>;
}

/// [`RulesOracle`] implementation on top of the `shakmaty` move generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShakmatyRules;

impl ShakmatyRules {
    fn position(&self, fen: &str) -> Result<Chess, EngineError> {
        let parsed: Fen = fen.parse().map_err(|e| EngineError::Position {
            reason: format!("unparseable FEN '{fen}': {e}"),
        })?;
        parsed
            .into_position(CastlingMode::Standard)
            .map_err(|e| EngineError::Position {
                reason: format!("illegal position '{fen}': {e}"),
            })
    }

    fn parse_move(&self, pos: &Chess, mv: &str) -> Result<shakmaty::Move, EngineError> {
        let uci: UciMove = mv.parse().map_err(|_| EngineError::IllegalMove {
            mv: mv.to_string(),
        })?;
        uci.to_move(pos).map_err(|_| EngineError::IllegalMove {
            mv: mv.to_string(),
        })
    }
}

impl RulesOracle for ShakmatyRules {
    fn validate(&self, fen: &str, mv: &str, crowd_color: Color) -> Result<(), EngineError> {
        let pos = self.position(fen)?;
        if from_shakmaty(pos.turn()) != crowd_color {
            debug!(%mv, "Vote cast out of turn");
            return Err(EngineError::IllegalMove { mv: mv.to_string() });
        }
        self.parse_move(&pos, mv)?;
        Ok(())
    }

    fn legal_moves(&self, fen: &str) -> Result<Vec<String>, EngineError> {
        let pos = self.position(fen)?;
        Ok(pos
            .legal_moves()
            .iter()
            .map(|m| m.to_uci(CastlingMode::Standard).to_string())
            .collect())
    }

    fn apply(&self, fen: &str, mv: &str) -> Result<MoveOutcome, EngineError> {
        let pos = self.position(fen)?;
        let m = self.parse_move(&pos, mv)?;
        let next = pos.play(&m).map_err(|_| EngineError::IllegalMove {
            mv: mv.to_string(),
        })?;
        Ok(MoveOutcome {
            position: Fen::from_position(next.clone(), EnPassantMode::Legal).to_string(),
            side_to_move: from_shakmaty(next.turn()),
            checkmate: next.is_checkmate(),
        })
    }

    fn side_to_move(&self, fen: &str) -> Result<Color, EngineError> {
        Ok(from_shakmaty(self.position(fen)?.turn()))
    }
}

fn from_shakmaty(color: shakmaty::Color) -> Color {
    match color {
        shakmaty::Color::White => Color::White,
        shakmaty::Color::Black => Color::Black,
    }
}
