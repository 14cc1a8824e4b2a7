//! The match engine: owns match lifecycle, vote aggregation, round
//! resolution, termination detection, and archival.
//!
//! One engine value is constructed at startup and handed to both the HTTP
//! layer and the scheduler task; all state lives in the injected stores, so
//! any number of engine instances (in this process or others) can serve the
//! same matches concurrently. Every operation re-reads the stores — nothing
//! is cached in process.

use crate::error::{EngineError, StoreError};
use crate::model::{voting_key, ArchivedMatch, ChessMatch, MatchSpec, Winner};
use crate::oracle::{OpponentOracle, RulesOracle};
use crate::store::{ArchiveStore, MatchStore, TallyStore, Versioned};
use chrono::Utc;
use rand::seq::IndexedRandom;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{debug, error, info, instrument, warn};

/// Attempts per resolution before giving up on a contended match; the next
/// scheduler tick picks it up again.
const MAX_CAS_RETRIES: u32 = 3;

/// Resolves crowd-vs-machine matches. See the module docs for the ownership
/// and concurrency model.
#[derive(Clone)]
pub struct MatchEngine {
    matches: Arc<dyn MatchStore>,
    tallies: Arc<dyn TallyStore>,
    archive: Arc<dyn ArchiveStore>,
    rules: Arc<dyn RulesOracle>,
    opponent: Arc<dyn OpponentOracle>,
}

impl MatchEngine {
    /// Creates an engine over the given stores and oracles.
    pub fn new(
        matches: Arc<dyn MatchStore>,
        tallies: Arc<dyn TallyStore>,
        archive: Arc<dyn ArchiveStore>,
        rules: Arc<dyn RulesOracle>,
        opponent: Arc<dyn OpponentOracle>,
    ) -> Self {
        info!("Creating match engine");
        Self {
            matches,
            tallies,
            archive,
            rules,
            opponent,
        }
    }

    /// Registers a new match at the standard starting position.
    ///
    /// # Errors
    ///
    /// [`EngineError::DuplicateMatch`] if the name already denotes a live
    /// match.
    #[instrument(skip(self, spec), fields(game = %spec.name))]
    pub async fn create_match(&self, spec: MatchSpec) -> Result<(), EngineError> {
        let now = Utc::now().timestamp_millis();
        let record = ChessMatch::new(&spec, now);
        match self.matches.insert(&record).await {
            Ok(()) => {
                info!(
                    game = %record.name,
                    round_period = record.round_period,
                    crowd_color = %record.crowd_color,
                    "Match created"
                );
                Ok(())
            }
            Err(StoreError::AlreadyExists { key }) => {
                warn!(game = %key, "Match name already taken");
                Err(EngineError::DuplicateMatch { name: key })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Casts one vote for `mv` in the named match's current round.
    ///
    /// Votes never mutate the board; they only grow the tally for the round
    /// in progress. Repeated votes are additive — no voter identity is
    /// tracked here. Returns the new count for the move.
    ///
    /// # Errors
    ///
    /// [`EngineError::MatchNotFound`], [`EngineError::MatchFinished`], or
    /// [`EngineError::IllegalMove`] for malformed, illegal, or out-of-turn
    /// moves (uniformly reported).
    #[instrument(skip(self), fields(game = %name, mv = %mv))]
    pub async fn cast_vote(&self, name: &str, mv: &str) -> Result<u64, EngineError> {
        let record = self.load(name).await?.value;
        if record.is_finished {
            warn!(game = %name, "Vote rejected: match is finished");
            return Err(EngineError::MatchFinished {
                name: name.to_string(),
            });
        }
        self.rules
            .validate(&record.position, mv, record.crowd_color)?;

        // The tally is keyed by the position the vote was validated against.
        // If the round resolves between validation and increment, the vote
        // lands in a tally that is never read again — accepted race.
        let count = self.tallies.increment(&record.voting_key(), mv, 1).await?;
        info!(game = %name, mv = %mv, count, "Vote registered");
        Ok(count)
    }

    /// The top `n` voted moves for the match's current position, count
    /// descending, ties in first-vote order.
    #[instrument(skip(self), fields(game = %name))]
    pub async fn leaderboard(
        &self,
        name: &str,
        n: usize,
    ) -> Result<Vec<(String, u64)>, EngineError> {
        let record = self.load(name).await?.value;
        Ok(self.tallies.top_n(&record.voting_key(), n).await?)
    }

    /// Loads the full live record of a match.
    #[instrument(skip(self), fields(game = %name))]
    pub async fn get_match(&self, name: &str) -> Result<ChessMatch, EngineError> {
        Ok(self.load(name).await?.value)
    }

    /// Names of all live matches.
    #[instrument(skip(self))]
    pub async fn list_match_names(&self) -> Result<Vec<String>, EngineError> {
        Ok(self.matches.list_names().await?)
    }

    /// Archived records for a match name, newest first.
    #[instrument(skip(self), fields(game = %name))]
    pub async fn list_archived(
        &self,
        name: &str,
        limit: usize,
    ) -> Result<Vec<ArchivedMatch>, EngineError> {
        Ok(self.archive.find(name, limit).await?)
    }

    /// Scheduler entry point: resolves every match whose round is inside its
    /// grace window at `now_ms`.
    ///
    /// Matches are processed in independent tasks so a slow oracle call for
    /// one match never delays the others. Failures are logged per match and
    /// left for the next tick — a failed match's deadline was not advanced,
    /// so the same round simply comes due again.
    #[instrument(skip(self))]
    pub async fn check_and_resolve_rounds(&self, now_ms: i64) {
        let names = match self.matches.list_names().await {
            Ok(names) => names,
            Err(e) => {
                error!(error = %e, "Failed to list matches; skipping tick");
                return;
            }
        };

        let mut tasks = JoinSet::new();
        for name in names {
            let engine = self.clone();
            tasks.spawn(async move {
                let outcome = engine.resolve_match(&name, now_ms).await;
                (name, outcome)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(()))) => {}
                Ok((name, Err(e))) => {
                    warn!(game = %name, error = %e, "Round resolution failed; retrying next tick");
                }
                Err(e) => error!(error = %e, "Resolution task panicked"),
            }
        }
    }

    /// Tick interval for the scheduler: half the shortest registered round
    /// period, clamped to at least one second and at most `cadence`.
    pub async fn tick_interval(&self, cadence: Duration) -> Duration {
        let names = match self.matches.list_names().await {
            Ok(names) => names,
            Err(_) => return cadence,
        };
        let mut shortest = cadence;
        for name in names {
            if let Ok(Some(v)) = self.matches.get(&name).await {
                let half = Duration::from_secs((v.value.round_period / 2).max(1));
                shortest = shortest.min(half);
            }
        }
        shortest
    }

    async fn load(&self, name: &str) -> Result<Versioned, EngineError> {
        self.matches
            .get(name)
            .await?
            .ok_or_else(|| EngineError::MatchNotFound {
                name: name.to_string(),
            })
    }

    /// Resolves one match if it is due, retrying on version conflicts with a
    /// fresh read each time. The compare-and-swap at the end is the sole
    /// commit point: a failure anywhere earlier leaves the stored match
    /// untouched.
    async fn resolve_match(&self, name: &str, now_ms: i64) -> Result<(), EngineError> {
        for attempt in 0..=MAX_CAS_RETRIES {
            let Versioned {
                value: mut record,
                version,
            } = self.load(name).await?;

            if !record.is_due(now_ms) {
                return Ok(());
            }

            if record.is_finished {
                self.archive_and_reset(&mut record, now_ms).await?;
            } else {
                self.resolve_round(&mut record, now_ms).await?;
            }

            match self.matches.compare_and_swap(&record, version).await {
                Ok(_) => return Ok(()),
                Err(StoreError::Conflict { .. }) if attempt < MAX_CAS_RETRIES => {
                    debug!(game = %name, attempt, "Version conflict; re-reading match");
                    continue;
                }
                Err(e) => return Err(e.into()),
            }
        }
        unreachable!("loop returns on success, conflict exhaustion, or error")
    }

    /// Closes the current voting round: commits the winning (or fallback)
    /// move, then solicits the opponent's reply unless the game ended.
    async fn resolve_round(
        &self,
        record: &mut ChessMatch,
        now_ms: i64,
    ) -> Result<(), EngineError> {
        // Opening round of a match where the crowd plays black: the machine
        // owns the first ply, and voting starts once it has moved.
        if self.rules.side_to_move(&record.position)? != record.crowd_color {
            let reply = self.opponent_move(record).await?;
            info!(game = %record.name, mv = %reply, "Opponent played the opening move");
            self.push_move(record, &reply)?;
            record.restart_round(now_ms);
            return Ok(());
        }

        let key = record.voting_key();
        let tally = self.tallies.top_n(&key, usize::MAX).await?;

        let chosen = match tally.first() {
            Some((mv, count)) => {
                info!(game = %record.name, mv = %mv, votes = count, "Crowd move elected");
                mv.clone()
            }
            None => {
                // Zero participation: pick any legal move so the match
                // always progresses. Checkmate is the only terminal state,
                // so a drawn position (stalemate, dead material) also lands
                // here with no legal moves and the round stays due, failing
                // each tick until an operator removes the match.
                let legal = self.rules.legal_moves(&record.position)?;
                let mv = legal
                    .choose(&mut rand::rng())
                    .cloned()
                    .ok_or_else(|| EngineError::Position {
                        reason: format!(
                            "unfinished match '{}' has no legal moves",
                            record.name
                        ),
                    })?;
                info!(game = %record.name, mv = %mv, "No votes; random legal move selected");
                mv
            }
        };

        // Snapshot the distribution before the position moves on, so the
        // round's votes stay visible in history.
        record.tally_snapshots.insert(record.position.clone(), tally);
        self.push_move(record, &chosen)?;

        if record.is_finished {
            info!(game = %record.name, winner = ?record.winner, "Crowd move delivered mate");
        } else {
            let reply = self.opponent_move(record).await?;
            self.push_move(record, &reply)?;
            if record.is_finished {
                info!(game = %record.name, winner = ?record.winner, "Opponent move delivered mate");
            } else {
                debug!(game = %record.name, mv = %reply, "Opponent replied");
            }
        }

        record.restart_round(now_ms);
        Ok(())
    }

    /// Second pass over a finished match: purge its historical tallies,
    /// archive the record, and reinitialize it in place for a new cycle.
    async fn archive_and_reset(
        &self,
        record: &mut ChessMatch,
        now_ms: i64,
    ) -> Result<(), EngineError> {
        for fen in record.tally_snapshots.keys() {
            self.tallies
                .delete(&voting_key(&record.name, fen))
                .await?;
        }

        self.archive
            .insert(&ArchivedMatch {
                record: record.clone(),
                archived_at: now_ms,
            })
            .await?;

        info!(
            game = %record.name,
            moves = record.move_history.len(),
            winner = ?record.winner,
            "Match archived; starting a new cycle"
        );
        record.reset(now_ms);
        Ok(())
    }

    /// Applies one committed move to the record: board, history, and
    /// termination bookkeeping.
    fn push_move(&self, record: &mut ChessMatch, mv: &str) -> Result<(), EngineError> {
        let outcome = self.rules.apply(&record.position, mv)?;
        record.position = outcome.position;
        record.move_history.push(mv.to_string());

        if outcome.checkmate {
            record.is_finished = true;
            // The mated side is the one to move; the side that just moved
            // wins. Holds for either crowd color.
            record.winner = Some(if outcome.side_to_move == record.crowd_color {
                Winner::Opponent
            } else {
                Winner::Crowd
            });
        }
        Ok(())
    }

    /// Asks the opponent oracle for its reply, bounded by the match's time
    /// budget.
    async fn opponent_move(&self, record: &ChessMatch) -> Result<String, EngineError> {
        let budget = Duration::from_secs(record.opponent_time_budget);
        tokio::time::timeout(budget, self.opponent.best_move(&record.position, budget))
            .await
            .map_err(|_| EngineError::OracleTimeout {
                seconds: record.opponent_time_budget,
            })?
    }
}
