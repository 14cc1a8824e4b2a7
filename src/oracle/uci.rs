//! UCI subprocess opponent.
//!
//! Spawns a UCI-speaking engine (Stockfish in production) per request,
//! mirrors the minimal handshake, asks for a timed search, and reads the
//! `bestmove` line. A fresh process per reply keeps the driver stateless;
//! replies arrive at most once per round so the spawn cost is irrelevant.

use crate::error::EngineError;
use crate::oracle::OpponentOracle;
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{ChildStdout, Command};
use tracing::{debug, info, instrument};

/// Engine strength requested from the UCI engine (Stockfish skill scale).
const SKILL_LEVEL: u8 = 20;

/// Slice of the budget reserved for process startup and handshake, so the
/// search itself finishes inside the engine-side timeout.
const HANDSHAKE_MARGIN: Duration = Duration::from_millis(250);

/// [`OpponentOracle`] that shells out to a UCI engine binary.
pub struct UciOpponent {
    command: String,
}

impl UciOpponent {
    /// Creates an opponent backed by the UCI engine at `command`
    /// (e.g. `/usr/games/stockfish`).
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    async fn expect_line(
        lines: &mut Lines<BufReader<ChildStdout>>,
        marker: &str,
    ) -> Result<String, EngineError> {
        loop {
            let line = lines
                .next_line()
                .await
                .map_err(|e| unavailable(format!("engine read failed: {e}")))?
                .ok_or_else(|| unavailable(format!("engine exited before '{marker}'")))?;
            if line.starts_with(marker) {
                return Ok(line);
            }
        }
    }
}

fn unavailable(reason: String) -> EngineError {
    EngineError::OracleUnavailable { reason }
}

#[async_trait]
impl OpponentOracle for UciOpponent {
    #[instrument(skip(self), fields(command = %self.command))]
    async fn best_move(&self, fen: &str, budget: Duration) -> Result<String, EngineError> {
        let movetime = budget
            .saturating_sub(HANDSHAKE_MARGIN)
            .max(Duration::from_millis(50));
        debug!(%fen, ?movetime, "Starting UCI engine");

        let mut child = Command::new(&self.command)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| unavailable(format!("failed to spawn '{}': {e}", self.command)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| unavailable("failed to capture engine stdin".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| unavailable("failed to capture engine stdout".to_string()))?;
        let mut lines = BufReader::new(stdout).lines();

        let setup = format!(
            "uci\nsetoption name Skill Level value {SKILL_LEVEL}\nisready\n"
        );
        stdin
            .write_all(setup.as_bytes())
            .await
            .map_err(|e| unavailable(format!("engine write failed: {e}")))?;
        Self::expect_line(&mut lines, "uciok").await?;
        Self::expect_line(&mut lines, "readyok").await?;

        let go = format!(
            "position fen {fen}\ngo movetime {}\n",
            movetime.as_millis()
        );
        stdin
            .write_all(go.as_bytes())
            .await
            .map_err(|e| unavailable(format!("engine write failed: {e}")))?;

        let line = Self::expect_line(&mut lines, "bestmove").await?;
        let mv = line
            .split_whitespace()
            .nth(1)
            .filter(|mv| *mv != "(none)")
            .ok_or_else(|| unavailable(format!("engine returned no move: '{line}'")))?
            .to_string();

        // Best effort; the process dies with the handle either way.
        let _ = stdin.write_all(b"quit\n").await;

        info!(%fen, mv = %mv, "UCI engine replied");
        Ok(mv)
    }
}
