//! Adapter error types.
//!
//! Browser and artifact-store failures surface through [`AdapterError`].
//! Each variant carries enough context for the capture driver to log the
//! failure without inspecting opaque strings.

/// Unified error type for stepshot adapters.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    /// An I/O operation failed within the adapter.
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization or deserialization failed.
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// The arguments supplied to an operation are invalid.
    #[error("invalid parameters for `{operation}`: {reason}")]
    InvalidParams { operation: String, reason: String },

    /// A browser or store operation failed.
    #[error("execution failed for `{operation}`: {reason}")]
    ExecutionFailed { operation: String, reason: String },

    /// The browser reported an error for a DevTools command.
    #[error("CDP error in `{method}`: {message}")]
    Cdp { method: String, message: String },

    /// The browser could not be started or reached.
    #[error("browser launch failed: {0}")]
    LaunchFailed(String),

    /// An operation exceeded its time limit.
    #[error("timeout after {seconds}s: {reason}")]
    Timeout { seconds: u64, reason: String },
}

/// Convenience alias used throughout the adapters crate.
pub type Result<T> = std::result::Result<T, AdapterError>;
