//! In-memory store backends.
//!
//! Used for tests and single-process deployments; they honor the same
//! atomicity contracts (atomic increment, versioned match writes) as a real
//! backend would.

use crate::error::StoreError;
use crate::model::{ArchivedMatch, ChessMatch};
use crate::store::{ArchiveStore, MatchStore, TallyStore, Versioned};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// In-memory [`TallyStore`] preserving insertion order for tie-breaks.
#[derive(Debug, Clone, Default)]
pub struct MemoryTallyStore {
    // Per key: members in first-vote order with their counts.
    tallies: Arc<Mutex<HashMap<String, Vec<(String, u64)>>>>,
}

impl MemoryTallyStore {
    /// Creates an empty tally store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TallyStore for MemoryTallyStore {
    async fn increment(&self, key: &str, member: &str, delta: u64) -> Result<u64, StoreError> {
        let mut tallies = lock(&self.tallies)?;
        let entries = tallies.entry(key.to_string()).or_default();
        if let Some((_, count)) = entries.iter_mut().find(|(m, _)| m == member) {
            *count += delta;
            return Ok(*count);
        }
        entries.push((member.to_string(), delta));
        Ok(delta)
    }

    async fn top_n(&self, key: &str, n: usize) -> Result<Vec<(String, u64)>, StoreError> {
        let tallies = lock(&self.tallies)?;
        let mut entries = tallies.get(key).cloned().unwrap_or_default();
        // Stable sort keeps insertion order among equal counts.
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries.truncate(n);
        Ok(entries)
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut tallies = lock(&self.tallies)?;
        if tallies.remove(key).is_some() {
            debug!(key, "Tally removed");
        }
        Ok(())
    }
}

/// In-memory [`MatchStore`] with a monotonically increasing version stamp
/// per record.
#[derive(Debug, Clone, Default)]
pub struct MemoryMatchStore {
    records: Arc<Mutex<HashMap<String, (ChessMatch, u64)>>>,
}

impl MemoryMatchStore {
    /// Creates an empty match store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MatchStore for MemoryMatchStore {
    async fn insert(&self, record: &ChessMatch) -> Result<(), StoreError> {
        let mut records = lock(&self.records)?;
        if records.contains_key(&record.name) {
            return Err(StoreError::AlreadyExists {
                key: record.name.clone(),
            });
        }
        records.insert(record.name.clone(), (record.clone(), 1));
        Ok(())
    }

    async fn get(&self, name: &str) -> Result<Option<Versioned>, StoreError> {
        let records = lock(&self.records)?;
        Ok(records.get(name).map(|(value, version)| Versioned {
            value: value.clone(),
            version: *version,
        }))
    }

    async fn compare_and_swap(
        &self,
        record: &ChessMatch,
        expected: u64,
    ) -> Result<u64, StoreError> {
        let mut records = lock(&self.records)?;
        match records.get_mut(&record.name) {
            Some((value, version)) if *version == expected => {
                *value = record.clone();
                *version += 1;
                Ok(*version)
            }
            Some(_) => Err(StoreError::Conflict {
                key: record.name.clone(),
            }),
            None => Err(StoreError::Io {
                reason: format!("no record for '{}'", record.name),
            }),
        }
    }

    async fn list_names(&self) -> Result<Vec<String>, StoreError> {
        let records = lock(&self.records)?;
        let mut names: Vec<_> = records.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn delete(&self, name: &str) -> Result<(), StoreError> {
        let mut records = lock(&self.records)?;
        records.remove(name);
        Ok(())
    }
}

/// In-memory [`ArchiveStore`]; insertion order doubles as age order.
#[derive(Debug, Clone, Default)]
pub struct MemoryArchive {
    records: Arc<Mutex<Vec<ArchivedMatch>>>,
}

impl MemoryArchive {
    /// Creates an empty archive.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ArchiveStore for MemoryArchive {
    async fn insert(&self, record: &ArchivedMatch) -> Result<(), StoreError> {
        let mut records = lock(&self.records)?;
        records.push(record.clone());
        Ok(())
    }

    async fn find(&self, name: &str, limit: usize) -> Result<Vec<ArchivedMatch>, StoreError> {
        let records = lock(&self.records)?;
        Ok(records
            .iter()
            .rev()
            .filter(|a| a.record.name == name)
            .take(limit)
            .cloned()
            .collect())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<std::sync::MutexGuard<'_, T>, StoreError> {
    mutex.lock().map_err(|_| StoreError::Io {
        reason: "store mutex poisoned".to_string(),
    })
}
