//! Error types for Atelier

use thiserror::Error;

/// The main error type for Atelier operations
#[derive(Debug, Error)]
pub enum AtelierError {
    #[error("Remote service error: {0}")]
    RemoteService(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Artifact error: {0}")]
    Artifact(String),

    #[error("Unknown capability: {0}")]
    UnknownCapability(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Atelier operations
pub type Result<T> = std::result::Result<T, AtelierError>;

impl AtelierError {
    /// Whether this error was raised by a remote capability call.
    ///
    /// The pipeline absorbs these into the run's error list; everything
    /// else aborts the run.
    pub fn is_remote(&self) -> bool {
        matches!(self, AtelierError::RemoteService(_))
    }
}
