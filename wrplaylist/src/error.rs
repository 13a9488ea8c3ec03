//! Error types for wrplaylist

/// Program list loading errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Cannot read program file {path}: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid duration: {0:?}")]
    InvalidDuration(String),
}

/// Specialized Result type for wrplaylist
pub type Result<T> = std::result::Result<T, Error>;
