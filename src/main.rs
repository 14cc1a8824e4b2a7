//! Crowdchess - crowd-vs-machine chess voting server.

#![warn(missing_docs)]

use anyhow::Result;
use clap::Parser;
use crowdchess::{
    Cli, Color, Command, MatchEngine, MatchSpec, MemoryArchive, MemoryMatchStore,
    MemoryTallyStore, OpponentOracle, RandomOpponent, RulesOracle, Scheduler, ShakmatyRules,
    UciOpponent, router,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            host,
            port,
            game,
            round_period,
            first_round,
            opponent_budget,
            crowd_color,
            engine,
            random_opponent,
            tick,
        } => {
            serve(ServeConfig {
                host,
                port,
                game,
                round_period,
                first_round,
                opponent_budget,
                crowd_color,
                engine,
                random_opponent,
                tick,
            })
            .await
        }
    }
}

struct ServeConfig {
    host: String,
    port: u16,
    game: String,
    round_period: u64,
    first_round: Option<u64>,
    opponent_budget: u64,
    crowd_color: Color,
    engine: String,
    random_opponent: bool,
    tick: u64,
}

async fn serve(config: ServeConfig) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting crowdchess server");

    let rules: Arc<dyn RulesOracle> = Arc::new(ShakmatyRules);
    let opponent: Arc<dyn OpponentOracle> = if config.random_opponent {
        info!("Using random-move opponent");
        Arc::new(RandomOpponent::new(rules.clone()))
    } else {
        info!(engine = %config.engine, "Using UCI engine opponent");
        Arc::new(UciOpponent::new(config.engine.clone()))
    };

    let engine = MatchEngine::new(
        Arc::new(MemoryMatchStore::new()),
        Arc::new(MemoryTallyStore::new()),
        Arc::new(MemoryArchive::new()),
        rules,
        opponent,
    );

    // Bootstrap match; mirrors the public site's daily game, whose first
    // round runs half a period so the site has activity sooner.
    engine
        .create_match(MatchSpec {
            name: config.game.clone(),
            round_period: config.round_period,
            opponent_time_budget: config.opponent_budget,
            crowd_color: config.crowd_color,
            first_round: Some(config.first_round.unwrap_or(config.round_period / 2)),
        })
        .await?;

    Scheduler::new(engine.clone(), Duration::from_secs(config.tick.max(1))).spawn();

    let app = router(engine);
    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    info!(host = %config.host, port = config.port, game = %config.game, "Server ready");
    axum::serve(listener, app).await?;

    Ok(())
}
