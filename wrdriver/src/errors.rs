//! Error types for wrdriver
//!
//! Every variant here is transient from the scheduler's point of view:
//! a failed display is logged, backed off and skipped, never fatal.

/// Display driver errors
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("Cannot connect to browser at {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Driver protocol error: {0}")]
    Protocol(String),

    #[error("Unknown display driver: {0:?} (expected remote, marionette or cdp)")]
    UnknownDriver(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Specialized Result type for wrdriver
pub type Result<T> = std::result::Result<T, DriverError>;
