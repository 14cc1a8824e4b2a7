//! Storage interfaces consumed by the match engine.
//!
//! The engine owns all mutation of match and tally state but performs it
//! exclusively through these narrow traits, so multiple engine instances can
//! share the same backends in a horizontally scaled deployment.

mod archive;
mod matches;
mod memory;
mod tally;

pub use archive::ArchiveStore;
pub use matches::{MatchStore, Versioned};
pub use memory::{MemoryArchive, MemoryMatchStore, MemoryTallyStore};
pub use tally::TallyStore;
