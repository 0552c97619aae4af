//! HTTP API handlers for gml-ps

pub mod health;
pub mod package;
pub mod predict;

pub use health::health_routes;
pub use package::get_package_info;
pub use predict::{post_lookup, post_predictions, post_score};
