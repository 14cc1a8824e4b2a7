//! External oracles driven by the match engine.
//!
//! The engine never implements chess knowledge itself: move legality and
//! checkmate detection come from the rules oracle, the automated side's
//! replies from the opponent oracle.

mod opponent;
mod rules;
mod uci;

pub use opponent::{OpponentOracle, RandomOpponent};
pub use rules::{MoveOutcome, RulesOracle, ShakmatyRules};
pub use uci::UciOpponent;
