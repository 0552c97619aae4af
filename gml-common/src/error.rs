//! Common error types for Gramlytics

use thiserror::Error;

/// Common result type for Gramlytics operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared by the pipeline, the trainer and the prediction service
///
/// None of these are retried: every pipeline stage is a deterministic function of
/// its input, so a failed run is re-run after the offending input is fixed.
#[derive(Error, Debug)]
pub enum Error {
    /// A required source collection is absent or empty
    #[error("Missing data: {0}")]
    MissingData(String),

    /// Genre label never seen when the category mapping was fit
    ///
    /// Means the genre rules and the trained mapping have drifted apart.
    #[error("Unknown category '{label}' for '{song}' by '{artist}'")]
    UnknownCategory {
        label: String,
        artist: String,
        song: String,
    },

    /// Trained package disagrees with what the running code expects
    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: String, found: String },

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input record or parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Short machine-readable code, used in service error bodies
    pub fn code(&self) -> &'static str {
        match self {
            Error::MissingData(_) => "MISSING_DATA",
            Error::UnknownCategory { .. } => "UNKNOWN_CATEGORY",
            Error::VersionMismatch { .. } => "VERSION_MISMATCH",
            Error::Io(_) => "IO_ERROR",
            Error::Json(_) => "JSON_ERROR",
            Error::Config(_) => "CONFIG_ERROR",
            Error::InvalidInput(_) => "INVALID_INPUT",
        }
    }
}
