//! Loaded package metadata

use axum::{extract::State, Json};
use serde::Serialize;

use crate::{AppState, PackageInfo};

#[derive(Debug, Serialize)]
pub struct PackageInfoResponse {
    #[serde(flatten)]
    pub package: PackageInfo,
    pub build_git_hash: String,
    pub build_timestamp: String,
    pub uptime_seconds: i64,
}

/// GET /api/package
pub async fn get_package_info(State(state): State<AppState>) -> Json<PackageInfoResponse> {
    Json(PackageInfoResponse {
        package: state.package.as_ref().clone(),
        build_git_hash: env!("GIT_HASH").to_string(),
        build_timestamp: env!("BUILD_TIMESTAMP").to_string(),
        uptime_seconds: (chrono::Utc::now() - state.started_at).num_seconds(),
    })
}
