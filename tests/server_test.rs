//! HTTP surface tests driving the router in process.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use crowdchess::{
    router, Color, MatchEngine, MatchSpec, MemoryArchive, MemoryMatchStore, MemoryTallyStore,
    RandomOpponent, ShakmatyRules,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

async fn app() -> Router {
    let rules = Arc::new(ShakmatyRules);
    let engine = MatchEngine::new(
        Arc::new(MemoryMatchStore::new()),
        Arc::new(MemoryTallyStore::new()),
        Arc::new(MemoryArchive::new()),
        rules.clone(),
        Arc::new(RandomOpponent::new(rules)),
    );
    engine
        .create_match(MatchSpec {
            name: "Daily".to_string(),
            round_period: 86_400,
            opponent_time_budget: 60,
            crowd_color: Color::White,
            first_round: None,
        })
        .await
        .expect("bootstrap match");
    router(engine)
}

fn vote_request(game: &str, mv: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/game/vote")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "game": game, "move": mv }).to_string(),
        ))
        .expect("request")
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn valid_vote_is_acknowledged() {
    let app = app().await;

    let response = app.oneshot(vote_request("Daily", "e2e4")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["result"], "Vote (e2e4) registered in game 'Daily'");
    assert_eq!(body["status"]["status"], "ok");
}

#[tokio::test]
async fn invalid_move_returns_bad_request() {
    let app = app().await;

    let response = app.oneshot(vote_request("Daily", "invalid")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["status"]["status"], "error");
    assert_eq!(
        body["status"]["message"],
        "invalid move 'invalid'"
    );
}

#[tokio::test]
async fn unknown_game_returns_not_found() {
    let app = app().await;

    let response = app.oneshot(vote_request("Nightly", "e2e4")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_games_returns_live_match_names() {
    let app = app().await;

    let response = app.oneshot(get_request("/game/list-games")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["result"]["games"], json!(["Daily"]));
}

#[tokio::test]
async fn voting_status_reflects_cast_votes() {
    let app = app().await;

    app.clone()
        .oneshot(vote_request("Daily", "e2e4"))
        .await
        .unwrap();
    app.clone()
        .oneshot(vote_request("Daily", "e2e4"))
        .await
        .unwrap();
    app.clone()
        .oneshot(vote_request("Daily", "d2d4"))
        .await
        .unwrap();

    let response = app
        .oneshot(get_request("/game/status/voting/Daily"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(
        body["result"]["voting"],
        json!([["e2e4", 2], ["d2d4", 1]])
    );
}

#[tokio::test]
async fn game_status_exposes_the_live_record() {
    let app = app().await;

    let response = app
        .oneshot(get_request("/game/status/game/Daily"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let game = &body["result"]["game"];
    assert_eq!(game["name"], "Daily");
    assert_eq!(game["is_finished"], false);
    assert_eq!(
        game["position"],
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
    );
}

#[tokio::test]
async fn finished_games_listing_starts_empty() {
    let app = app().await;

    let response = app
        .oneshot(get_request("/game/finished-games?game=Daily&limit=5"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["result"]["games"], json!([]));
}
