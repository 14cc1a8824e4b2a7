//! Command-line interface for crowdchess.

use crate::model::Color;
use clap::{Parser, Subcommand};

/// Crowdchess - crowd-vs-machine chess voting server
#[derive(Parser, Debug)]
#[command(name = "crowdchess")]
#[command(about = "Crowd-vs-machine chess voting server", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the voting server and round scheduler
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "5002")]
        port: u16,

        /// Name of the match created at startup
        #[arg(long, default_value = "Daily")]
        game: String,

        /// Voting round length in seconds
        #[arg(long, default_value_t = 86_400)]
        round_period: u64,

        /// First round length in seconds; defaults to half the round period
        #[arg(long)]
        first_round: Option<u64>,

        /// Seconds the machine may think per reply; also the grace window
        /// before round closure
        #[arg(long, default_value_t = 60)]
        opponent_budget: u64,

        /// Which side the crowd controls
        #[arg(long, default_value = "white")]
        crowd_color: Color,

        /// Path to a UCI engine binary for the machine side
        #[arg(long, default_value = "/usr/games/stockfish")]
        engine: String,

        /// Play random legal moves instead of launching a UCI engine
        #[arg(long)]
        random_opponent: bool,

        /// Upper bound on the scheduler tick interval, in seconds
        #[arg(long, default_value_t = 1)]
        tick: u64,
    },
}
