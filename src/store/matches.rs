//! Durable match state keyed by match name, with versioned writes.

use crate::error::StoreError;
use crate::model::ChessMatch;
use async_trait::async_trait;

/// A match record paired with the version stamp it was read at.
#[derive(Debug, Clone)]
pub struct Versioned {
    /// The match record.
    pub value: ChessMatch,
    /// Store version stamp; passed back on write for conflict detection.
    pub version: u64,
}

/// Durable mapping from match name to its live state snapshot.
///
/// Writes are conditional on the version stamp read alongside the record, so
/// concurrent writers (votes never write here, but parallel engine instances
/// resolving the same round do) fail with [`StoreError::Conflict`] instead of
/// silently losing updates.
#[async_trait]
pub trait MatchStore: Send + Sync {
    /// Stores a brand-new match. Fails with [`StoreError::AlreadyExists`] if
    /// the name is taken.
    async fn insert(&self, record: &ChessMatch) -> Result<(), StoreError>;

    /// Loads a match and its current version, or `None` if absent.
    async fn get(&self, name: &str) -> Result<Option<Versioned>, StoreError>;

    /// Replaces the stored record if its version still equals `expected`,
    /// returning the new version. Fails with [`StoreError::Conflict`]
    /// otherwise.
    async fn compare_and_swap(
        &self,
        record: &ChessMatch,
        expected: u64,
    ) -> Result<u64, StoreError>;

    /// Names of all live matches.
    async fn list_names(&self) -> Result<Vec<String>, StoreError>;

    /// Removes a match record, if present.
    async fn delete(&self, name: &str) -> Result<(), StoreError>;
}
