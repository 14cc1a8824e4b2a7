//! Opponent oracle: selects the automated side's reply.

use crate::error::EngineError;
use crate::oracle::RulesOracle;
use async_trait::async_trait;
use rand::seq::IndexedRandom;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Produces the automated side's move for a position within a time budget.
///
/// The engine wraps every call in a timeout equal to the match's configured
/// budget; implementations should aim to answer inside it.
#[async_trait]
pub trait OpponentOracle: Send + Sync {
    /// Returns the chosen reply for `fen` in UCI.
    async fn best_move(&self, fen: &str, budget: Duration) -> Result<String, EngineError>;
}

/// Plays a uniformly random legal move. No engine binary required, so this
/// is the development and test default.
pub struct RandomOpponent {
    rules: Arc<dyn RulesOracle>,
}

impl RandomOpponent {
    /// Creates a random opponent drawing from the given rules oracle.
    pub fn new(rules: Arc<dyn RulesOracle>) -> Self {
        Self { rules }
    }
}

#[async_trait]
impl OpponentOracle for RandomOpponent {
    async fn best_move(&self, fen: &str, _budget: Duration) -> Result<String, EngineError> {
        let moves = self.rules.legal_moves(fen)?;
        let chosen = moves
            .choose(&mut rand::rng())
            .cloned()
            .ok_or_else(|| EngineError::OracleUnavailable {
                reason: format!("no legal moves in '{fen}'"),
            })?;
        debug!(%fen, mv = %chosen, "Random opponent picked a move");
        Ok(chosen)
    }
}
