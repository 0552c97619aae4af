//! Prediction endpoints
//!
//! Chart entries posted here are enriched with the service's award history (full
//! history, no cutoff) before scoring. Pre-enriched entries go to `/api/score`.

use axum::{extract::State, Json};
use gml_common::records::{ChartRecord, EnrichedEntry};
use gml_common::Prediction;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PredictionsRequest {
    pub charts: Vec<ChartRecord>,
}

#[derive(Debug, Serialize)]
pub struct PredictionsResponse {
    pub count: usize,
    /// Highest probability first
    pub predictions: Vec<Prediction>,
}

impl From<Vec<Prediction>> for PredictionsResponse {
    fn from(predictions: Vec<Prediction>) -> Self {
        Self {
            count: predictions.len(),
            predictions,
        }
    }
}

/// POST /api/predictions
///
/// Ranks every posted chart entry.
pub async fn post_predictions(
    State(state): State<AppState>,
    Json(request): Json<PredictionsRequest>,
) -> ApiResult<Json<PredictionsResponse>> {
    let predictions = state
        .predictor
        .predict_current(&request.charts, &state.history)?;

    info!(
        entries = predictions.len(),
        likely = predictions.iter().filter(|p| p.label).count(),
        "Ranked chart entries"
    );
    Ok(Json(predictions.into()))
}

/// POST /api/score
///
/// Scores one already-enriched entry. A genre that is not a known label, or one the
/// package was not trained on, is a 422.
pub async fn post_score(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> ApiResult<Json<Prediction>> {
    let entry: EnrichedEntry = serde_json::from_value(body)
        .map_err(|e| ApiError::Unprocessable(format!("Invalid entry: {}", e)))?;
    Ok(Json(state.predictor.predict_entry(&entry)?))
}

#[derive(Debug, Deserialize)]
pub struct LookupRequest {
    pub charts: Vec<ChartRecord>,
    #[serde(default)]
    pub song_title: Option<String>,
    #[serde(default)]
    pub artist_name: Option<String>,
}

/// POST /api/lookup
///
/// Predictions for the posted entries matching the song title and/or artist exactly.
pub async fn post_lookup(
    State(state): State<AppState>,
    Json(request): Json<LookupRequest>,
) -> ApiResult<Json<PredictionsResponse>> {
    let song = request.song_title.as_deref().filter(|s| !s.is_empty());
    let artist = request.artist_name.as_deref().filter(|s| !s.is_empty());
    if song.is_none() && artist.is_none() {
        return Err(ApiError::BadRequest(
            "song_title or artist_name is required".to_string(),
        ));
    }

    let predictions = state
        .predictor
        .lookup(&request.charts, &state.history, song, artist)?;
    Ok(Json(predictions.into()))
}
