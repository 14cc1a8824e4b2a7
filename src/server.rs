//! Thin HTTP surface over the match engine.
//!
//! Routes mirror the public site: vote submission, live match status, the
//! current leaderboard, and the archive of finished matches. All real
//! semantics live in [`MatchEngine`]; handlers only translate between JSON
//! and engine calls.

use crate::engine::MatchEngine;
use crate::error::EngineError;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

/// Default number of leaderboard entries returned by the status routes.
const LEADERBOARD_SIZE: usize = 3;

/// Body of a vote submission.
#[derive(Debug, Clone, Deserialize)]
pub struct VoteRequest {
    /// Match name to vote in.
    pub game: String,
    /// Candidate move in UCI.
    #[serde(rename = "move")]
    pub mv: String,
}

/// Query parameters for the finished-games listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ArchiveQuery {
    /// Match name to filter on.
    #[serde(default = "default_game")]
    pub game: String,
    /// Maximum number of records.
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_game() -> String {
    "Daily".to_string()
}

fn default_limit() -> usize {
    3
}

/// Builds the application router over a shared engine.
pub fn router(engine: MatchEngine) -> Router {
    Router::new()
        .route("/game/vote", post(vote))
        .route("/game/list-games", get(list_games))
        .route("/game/finished-games", get(finished_games))
        .route("/game/status/game/{game}", get(game_status))
        .route("/game/status/voting/{game}", get(voting_status))
        .with_state(engine)
}

/// Engine error wrapper mapping error kinds to HTTP statuses.
struct ApiError(EngineError);

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            EngineError::IllegalMove { .. } => StatusCode::BAD_REQUEST,
            EngineError::MatchNotFound { .. } => StatusCode::NOT_FOUND,
            EngineError::DuplicateMatch { .. } | EngineError::MatchFinished { .. } => {
                StatusCode::CONFLICT
            }
            EngineError::OracleUnavailable { .. } | EngineError::OracleTimeout { .. } => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            EngineError::Position { .. } | EngineError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        debug!(status = %status, error = %self.0, "Request failed");
        let body = json!({
            "status": { "status": "error", "message": self.0.to_string() }
        });
        (status, Json(body)).into_response()
    }
}

fn ok(result: Value) -> Json<Value> {
    Json(json!({
        "result": result,
        "status": { "status": "ok", "message": "success" }
    }))
}

async fn vote(
    State(engine): State<MatchEngine>,
    Json(req): Json<VoteRequest>,
) -> Result<Json<Value>, ApiError> {
    engine.cast_vote(&req.game, &req.mv).await?;
    info!(game = %req.game, mv = %req.mv, "Vote accepted");
    Ok(ok(json!(format!(
        "Vote ({}) registered in game '{}'",
        req.mv, req.game
    ))))
}

async fn list_games(State(engine): State<MatchEngine>) -> Result<Json<Value>, ApiError> {
    let names = engine.list_match_names().await?;
    Ok(ok(json!({ "games": names })))
}

async fn finished_games(
    State(engine): State<MatchEngine>,
    Query(query): Query<ArchiveQuery>,
) -> Result<Json<Value>, ApiError> {
    let archived = engine.list_archived(&query.game, query.limit).await?;
    Ok(ok(json!({ "games": archived })))
}

async fn game_status(
    State(engine): State<MatchEngine>,
    Path(game): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let record = engine.get_match(&game).await?;
    let voting = engine.leaderboard(&game, LEADERBOARD_SIZE).await?;
    Ok(ok(json!({ "game": record, "voting": voting })))
}

async fn voting_status(
    State(engine): State<MatchEngine>,
    Path(game): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let voting = engine.leaderboard(&game, LEADERBOARD_SIZE).await?;
    Ok(ok(json!({ "voting": voting })))
}
