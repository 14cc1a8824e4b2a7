//! Error types for the match engine and its storage backends.

use derive_more::{Display, Error};

/// Failure modes of the storage backends.
///
/// The engine treats these as opaque: request-path operations surface them to
/// the caller, scheduled resolution logs them and retries on the next tick.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum StoreError {
    /// A conditional write lost the race: the stored version no longer
    /// matches the version the caller read.
    #[display("version conflict on '{key}'")]
    Conflict {
        /// Key whose version stamp moved underneath the writer.
        key: String,
    },
    /// An insert targeted a key that already holds a record.
    #[display("key '{key}' already exists")]
    AlreadyExists {
        /// The occupied key.
        key: String,
    },
    /// The backend could not be reached or rejected the operation.
    #[display("store i/o failure: {reason}")]
    Io {
        /// Backend-supplied failure description.
        reason: String,
    },
}

/// Errors surfaced by [`crate::MatchEngine`] operations.
#[derive(Debug, Clone, Display, Error)]
pub enum EngineError {
    /// A live match with the same name already exists.
    #[display("match '{name}' already exists")]
    DuplicateMatch {
        /// The contested match name.
        name: String,
    },
    /// No live match is registered under the given name.
    #[display("match '{name}' not found")]
    MatchNotFound {
        /// The requested match name.
        name: String,
    },
    /// The match has reached a terminal position and no longer accepts votes.
    #[display("match '{name}' is finished")]
    MatchFinished {
        /// The finished match name.
        name: String,
    },
    /// The move is malformed, illegal in the current position, or cast out of
    /// turn. The three cases are deliberately indistinguishable to callers.
    #[display("invalid move '{mv}'")]
    IllegalMove {
        /// The rejected move text.
        mv: String,
    },
    /// The opponent oracle could not produce a move.
    #[display("opponent oracle unavailable: {reason}")]
    OracleUnavailable {
        /// What went wrong on the oracle side.
        reason: String,
    },
    /// The opponent oracle did not answer within its time budget.
    #[display("opponent oracle exceeded its {seconds}s budget")]
    OracleTimeout {
        /// The budget that was exhausted, in seconds.
        seconds: u64,
    },
    /// A persisted position failed to parse. Indicates store corruption, not
    /// a caller mistake.
    #[display("corrupt stored position: {reason}")]
    Position {
        /// Parser diagnostics for the offending record.
        reason: String,
    },
    /// A storage backend failed.
    #[display("store failure: {_0}")]
    Store(StoreError),
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

impl EngineError {
    /// True for errors caused by the request itself rather than by the
    /// engine's collaborators; these are never retried.
    pub fn is_request_error(&self) -> bool {
        matches!(
            self,
            Self::DuplicateMatch { .. }
                | Self::MatchNotFound { .. }
                | Self::MatchFinished { .. }
                | Self::IllegalMove { .. }
        )
    }
}
