//! Periodic driver for round resolution.

use crate::engine::MatchEngine;
use chrono::Utc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

/// Fires the engine's round check on a fixed cadence.
///
/// The effective interval shrinks to half the shortest registered round
/// period so no match's grace window can fall between two ticks; `cadence`
/// is only an upper bound.
pub struct Scheduler {
    engine: MatchEngine,
    cadence: Duration,
}

impl Scheduler {
    /// Creates a scheduler driving `engine` at most every `cadence`.
    pub fn new(engine: MatchEngine, cadence: Duration) -> Self {
        Self { engine, cadence }
    }

    /// Runs the tick loop forever.
    #[instrument(skip(self), fields(cadence = ?self.cadence))]
    pub async fn run(self) {
        info!("Scheduler started");
        loop {
            let now = Utc::now().timestamp_millis();
            self.engine.check_and_resolve_rounds(now).await;

            let interval = self.engine.tick_interval(self.cadence).await;
            debug!(?interval, "Tick complete");
            tokio::time::sleep(interval).await;
        }
    }

    /// Spawns the tick loop as a background task.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}
