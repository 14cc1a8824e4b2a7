//! Append-only archive of finished matches.

use crate::error::StoreError;
use crate::model::ArchivedMatch;
use async_trait::async_trait;

/// Append-only document store of finished matches, queryable newest first.
#[async_trait]
pub trait ArchiveStore: Send + Sync {
    /// Appends one archived match. Records are never updated afterwards.
    async fn insert(&self, record: &ArchivedMatch) -> Result<(), StoreError>;

    /// Returns up to `limit` archived matches with the given name, newest
    /// first.
    async fn find(&self, name: &str, limit: usize) -> Result<Vec<ArchivedMatch>, StoreError>;
}
