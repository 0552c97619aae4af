//! Integration tests for gml-ps API endpoints
//!
//! Tests cover:
//! - Health endpoint
//! - Package metadata
//! - Ranked predictions, single-entry scoring and lookup
//! - Error statuses and the JSON error body

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use gml_common::dataset::DatasetBuilder;
use gml_common::genre::CategoryInferencer;
use gml_common::identity::ExactNormalizer;
use gml_common::package::TrainedPackage;
use gml_common::records::{AwardRecord, ChartRecord};
use gml_common::training::{train, TrainingParams};
use gml_ps::{build_router, AppState};
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot` method

fn award(year: i32, category: &str, song: &str, artist: &str, winner: bool) -> AwardRecord {
    AwardRecord {
        year,
        category: category.to_string(),
        song_title: Some(song.to_string()),
        artist_name: artist.to_string(),
        is_nominated: true,
        is_winner: winner,
    }
}

fn awards() -> Vec<AwardRecord> {
    vec![
        award(2020, "Record of the Year", "Bad Guy", "Billie Eilish", true),
        award(2021, "Best Pop Solo Performance", "Watermelon Sugar", "Harry Styles", true),
        award(2021, "Best Rap Song", "Savage", "Megan Thee Stallion", true),
        award(2022, "Best R&B Performance", "Leave The Door Open", "Silk Sonic", true),
        award(2022, "Song of the Year", "Happier Than Ever", "Billie Eilish", false),
        award(2023, "Best Rap Performance", "The Heart Part 5", "Kendrick Lamar", true),
        award(2023, "Best Rock Song", "Broken Horses", "Brandi Carlile", true),
        award(2024, "Record of the Year", "What Was I Made For?", "Billie Eilish", false),
    ]
}

fn charts_json() -> Value {
    json!([
        {"song_title": "Not Like Us", "artist_name": "Kendrick Lamar", "peak_position": 1, "weeks_on_chart": 28, "current_rank": 4},
        {"song_title": "Some Deep Cut", "artist_name": "Unknown Newcomer", "peak_position": 88, "weeks_on_chart": 1, "current_rank": 97},
        {"song_title": "Birds Of A Feather", "artist_name": "Billie Eilish", "peak_position": 2, "weeks_on_chart": 30, "current_rank": 3}
    ])
}

/// Test helper: Train a package on the fixture corpus and build the app
fn setup_app() -> axum::Router {
    let charts: Vec<ChartRecord> = serde_json::from_value(charts_json()).unwrap();
    let inferencer = CategoryInferencer::default();
    let dataset = DatasetBuilder::new(&ExactNormalizer, &inferencer)
        .build(&awards(), &charts)
        .unwrap();
    let package = TrainedPackage::new(train(&dataset.training, &TrainingParams::default()).unwrap());

    let state = AppState::new(package, &awards(), Box::new(ExactNormalizer), inferencer).unwrap();
    build_router(state)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Test helper: Extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

// =============================================================================
// Health and metadata
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let response = setup_app().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "gml-ps");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_package_metadata() {
    let response = setup_app().oneshot(get("/api/package")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["version"], "1.0");
    assert_eq!(body["feature_names"][0], "peak_position");
    assert_eq!(body["feature_names"][4], "genre_encoded");
    assert_eq!(body["genres"].as_array().unwrap().len(), 6);
    assert!(body["evaluation"]["accuracy"].is_number());
}

// =============================================================================
// Predictions
// =============================================================================

#[tokio::test]
async fn test_predictions_are_ranked() {
    let request = post_json("/api/predictions", json!({"charts": charts_json()}));
    let response = setup_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["count"], 3);
    let predictions = body["predictions"].as_array().unwrap();
    let probabilities: Vec<f64> = predictions
        .iter()
        .map(|p| p["probability"].as_f64().unwrap())
        .collect();
    assert!(probabilities.windows(2).all(|w| w[0] >= w[1]));
    assert_eq!(predictions[2]["song_title"], "Some Deep Cut");

    let kendrick = predictions
        .iter()
        .find(|p| p["artist_name"] == "Kendrick Lamar")
        .unwrap();
    assert_eq!(kendrick["current_rank"], 4);
    assert_eq!(
        kendrick["explanation"][3],
        "Rap genre - historically strong Grammy presence"
    );
    assert!(kendrick["verdict"].is_string());
}

#[tokio::test]
async fn test_empty_charts_is_bad_request() {
    let request = post_json("/api/predictions", json!({"charts": []}));
    let response = setup_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "MISSING_DATA");
}

#[tokio::test]
async fn test_invalid_chart_row_is_bad_request() {
    let request = post_json(
        "/api/predictions",
        json!({"charts": [{"song_title": "X", "artist_name": "Y", "peak_position": 0, "weeks_on_chart": 3}]}),
    );
    let response = setup_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_score_enriched_entry() {
    let entry = json!({
        "song_title": "Espresso",
        "artist_name": "Sabrina Carpenter",
        "peak_position": 3,
        "weeks_on_chart": 25,
        "genre": "Pop",
        "artist_past_grammy_noms": 0,
        "artist_past_grammy_wins": 1
    });
    let response = setup_app()
        .oneshot(post_json("/api/score", entry))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(
        body["explanation"],
        json!([
            "Top 5 hit - strong chart performance",
            "Extended chart run (20+ weeks) - shows longevity",
            "Grammy winner (1 win) - proven track record",
            "Pop genre - historically strong Grammy presence"
        ])
    );
    let probability = body["probability"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&probability));
    assert_eq!(body["label"], probability >= 0.5);
}

#[tokio::test]
async fn test_score_unknown_genre_is_unprocessable() {
    let entry = json!({
        "song_title": "So What",
        "artist_name": "Miles Davis",
        "peak_position": 40,
        "weeks_on_chart": 2,
        "genre": "Jazz",
        "prior_nominations": 0,
        "prior_wins": 0
    });
    let response = setup_app()
        .oneshot(post_json("/api/score", entry))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = extract_json(response.into_body()).await;
    assert!(body["error"]["message"].is_string());
}

#[tokio::test]
async fn test_score_zero_peak_is_bad_request() {
    let entry = json!({
        "song_title": "Espresso",
        "artist_name": "Sabrina Carpenter",
        "peak_position": 0,
        "weeks_on_chart": 25,
        "genre": "Pop",
        "prior_nominations": 0,
        "prior_wins": 1
    });
    let response = setup_app()
        .oneshot(post_json("/api/score", entry))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "INVALID_INPUT");
}

// =============================================================================
// Lookup
// =============================================================================

#[tokio::test]
async fn test_lookup_by_artist() {
    let request = post_json(
        "/api/lookup",
        json!({"charts": charts_json(), "artist_name": "Billie Eilish"}),
    );
    let response = setup_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["predictions"][0]["song_title"], "Birds Of A Feather");
}

#[tokio::test]
async fn test_lookup_without_criteria_is_bad_request() {
    let request = post_json("/api/lookup", json!({"charts": charts_json()}));
    let response = setup_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}
