//! Ranked vote counters, one set per match and position pair.

use crate::error::StoreError;
use async_trait::async_trait;

/// A ranked multiset of candidate moves with atomic increments.
///
/// Keys are `"{match_name}:{fen}"`. Entries are created implicitly on first
/// increment and removed wholesale with [`TallyStore::delete`] when a match
/// is archived.
#[async_trait]
pub trait TallyStore: Send + Sync {
    /// Atomically adds `delta` votes for `member` under `key`, returning the
    /// new count.
    async fn increment(&self, key: &str, member: &str, delta: u64) -> Result<u64, StoreError>;

    /// Returns up to `n` members ordered by count descending. Ties rank the
    /// member that reached the count first (insertion order) higher; callers
    /// rely on this for deterministic resolution.
    async fn top_n(&self, key: &str, n: usize) -> Result<Vec<(String, u64)>, StoreError>;

    /// Removes the entire tally under `key`, if any.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}
