//! # Gramlytics Common Library
//!
//! Shared code for the Gramlytics trainer and prediction service including:
//! - Award-history and chart records
//! - Artist name normalization and award history aggregation
//! - Genre inference from award categories
//! - Feature encoding, scoring and explanations
//! - Dataset assembly, training and the trained package
//! - Configuration loading

pub mod config;
pub mod dataset;
pub mod error;
pub mod explain;
pub mod features;
pub mod genre;
pub mod history;
pub mod identity;
pub mod model;
pub mod package;
pub mod pipeline;
pub mod records;
pub mod scorer;
pub mod training;

pub use error::{Error, Result};
pub use genre::Genre;
pub use identity::MatchKey;
pub use pipeline::{Prediction, Predictor};
