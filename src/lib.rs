//! Crowdchess - a crowd-vs-machine chess match engine.
//!
//! Anonymous participants vote on the crowd's next move; on a timer the most
//! voted move is committed, an automated opponent replies, and the cycle
//! repeats until checkmate, after which the match is archived and restarted.
//!
//! # Architecture
//!
//! - **Engine**: match lifecycle, vote aggregation, round resolution
//! - **Stores**: injected tally / match-state / archive backends
//! - **Oracles**: chess rules (`shakmaty`) and the automated opponent (UCI)
//! - **Scheduler**: timer loop driving round resolution
//! - **Server**: thin axum routes over the engine
//!
//! # Example
//!
//! ```no_run
//! use crowdchess::{
//!     MatchEngine, MatchSpec, MemoryArchive, MemoryMatchStore, MemoryTallyStore,
//!     RandomOpponent, ShakmatyRules, Color,
//! };
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), crowdchess::EngineError> {
//! let rules = Arc::new(ShakmatyRules);
//! let engine = MatchEngine::new(
//!     Arc::new(MemoryMatchStore::new()),
//!     Arc::new(MemoryTallyStore::new()),
//!     Arc::new(MemoryArchive::new()),
//!     rules.clone(),
//!     Arc::new(RandomOpponent::new(rules)),
//! );
//!
//! engine
//!     .create_match(MatchSpec {
//!         name: "Daily".to_string(),
//!         round_period: 86_400,
//!         opponent_time_budget: 60,
//!         crowd_color: Color::White,
//!         first_round: None,
//!     })
//!     .await?;
//! engine.cast_vote("Daily", "e2e4").await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod cli;
mod engine;
mod error;
mod model;
mod oracle;
mod scheduler;
mod server;
mod store;

// Crate-level exports - CLI
pub use cli::{Cli, Command};

// Crate-level exports - Engine
pub use engine::MatchEngine;

// Crate-level exports - Errors
pub use error::{EngineError, StoreError};

// Crate-level exports - Data model
pub use model::{
    voting_key, ArchivedMatch, ChessMatch, Color, MatchSpec, Winner, STARTING_FEN,
};

// Crate-level exports - Oracles
pub use oracle::{
    MoveOutcome, OpponentOracle, RandomOpponent, RulesOracle, ShakmatyRules, UciOpponent,
};

// Crate-level exports - Scheduler
pub use scheduler::Scheduler;

// Crate-level exports - HTTP surface
pub use server::{router, ArchiveQuery, VoteRequest};

// Crate-level exports - Stores
pub use store::{
    ArchiveStore, MatchStore, MemoryArchive, MemoryMatchStore, MemoryTallyStore, TallyStore,
    Versioned,
};
