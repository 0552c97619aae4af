//! gml-ps library - Prediction Service
//!
//! Scores chart entries against a trained package over HTTP/JSON. All shared state
//! is read-only and lives behind `Arc`.

use axum::Router;
use chrono::{DateTime, Utc};
use gml_common::genre::CategoryInferencer;
use gml_common::history::HistoryIndex;
use gml_common::identity::IdentityResolver;
use gml_common::package::TrainedPackage;
use gml_common::records::AwardRecord;
use gml_common::training::EvaluationReport;
use gml_common::Predictor;
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

pub mod api;
pub mod error;

/// Metadata of the loaded package, as served by `GET /api/package`
#[derive(Debug, Clone, Serialize)]
pub struct PackageInfo {
    pub version: String,
    pub trained_at: DateTime<Utc>,
    pub feature_names: Vec<String>,
    pub genres: Vec<String>,
    pub mapping_fingerprint: String,
    pub evaluation: Option<EvaluationReport>,
}

impl PackageInfo {
    fn from_package(package: &TrainedPackage) -> Self {
        Self {
            version: package.version.clone(),
            trained_at: package.trained_at,
            feature_names: package.feature_names.clone(),
            genres: package
                .category_mapping
                .labels()
                .map(str::to_string)
                .collect(),
            mapping_fingerprint: package.category_mapping.fingerprint().to_string(),
            evaluation: package.evaluation.clone(),
        }
    }
}

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<Predictor>,
    /// Award history indexed by artist, used to enrich incoming chart entries
    pub history: Arc<HistoryIndex>,
    pub package: Arc<PackageInfo>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Verify the package and index the award history
    ///
    /// # Errors
    /// `gml_common::Error::VersionMismatch` if the package disagrees with this build.
    pub fn new(
        package: TrainedPackage,
        awards: &[AwardRecord],
        resolver: Box<dyn IdentityResolver>,
        inferencer: CategoryInferencer,
    ) -> gml_common::Result<Self> {
        let info = PackageInfo::from_package(&package);
        let history = HistoryIndex::build(awards, resolver.as_ref());
        let predictor = Predictor::from_package(package, resolver, inferencer)?;

        info!(
            artists = history.artist_count(),
            awards = history.record_count(),
            genres = info.genres.len(),
            "Prediction state ready"
        );

        Ok(Self {
            predictor: Arc::new(predictor),
            history: Arc::new(history),
            package: Arc::new(info),
            started_at: Utc::now(),
        })
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let api = Router::new()
        .route("/api/package", get(api::get_package_info))
        .route("/api/predictions", post(api::post_predictions))
        .route("/api/score", post(api::post_score))
        .route("/api/lookup", post(api::post_lookup));

    Router::new()
        .merge(api)
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
