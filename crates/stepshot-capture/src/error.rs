//! Capture engine error types.
//!
//! Only systemic failures are errors here.  A pattern that matches nothing,
//! or a phase whose control is missing, is an ordinary outcome and never
//! surfaces as a [`CaptureError`].

use stepshot_adapters::AdapterError;

/// Unified error type for the capture engine.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// A browser or artifact-store operation failed.
    #[error("adapter error: {0}")]
    Adapter(#[from] AdapterError),

    /// The configuration file or an override could not be used.
    #[error("invalid configuration in `{source_name}`: {reason}")]
    Config { source_name: String, reason: String },

    /// No application entry URL is configured at all.
    #[error("no entry URL configured for application `{application}`")]
    NoEntryUrl { application: String },

    /// Reading the configuration file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization of a run record failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout the capture crate.
pub type Result<T> = std::result::Result<T, CaptureError>;
