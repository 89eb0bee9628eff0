//! Explorer error types.

use thiserror::Error;

/// Errors raised while configuring the explorer or loading its artifacts.
///
/// Only [`ExplorerError::RequiredArtifact`] ever reaches the user at startup;
/// the remaining variants describe why an individual fetch failed and are
/// folded into it (or swallowed, for optional artifacts).
#[derive(Debug, Error)]
pub enum ExplorerError {
    /// A required artifact could not be fetched or parsed. Startup stops here.
    #[error("required artifact '{name}' failed to load: {reason}")]
    RequiredArtifact {
        /// Artifact file name (e.g. `module_graph.json`).
        name: String,
        /// Diagnostic detail from the underlying failure.
        reason: String,
    },

    /// The transport failed before a response was received.
    #[error("fetch failed: {url} ({reason})")]
    Fetch { url: String, reason: String },

    /// A response was received but was not a success.
    #[error("fetch failed: {url} ({status})")]
    Status { url: String, status: u16 },

    /// The body was not valid JSON for the expected shape.
    #[error("could not parse '{name}': {source}")]
    Parse {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    /// Invalid configuration (bad base URL, unreadable config file).
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ExplorerError {
    /// Get an error code for this error type.
    pub fn code(&self) -> &'static str {
        match self {
            Self::RequiredArtifact { .. } => "REQUIRED_ARTIFACT",
            Self::Fetch { .. } => "FETCH",
            Self::Status { .. } => "STATUS",
            Self::Parse { .. } => "PARSE",
            Self::Config(_) => "CONFIG",
            Self::Io(_) => "IO",
        }
    }

    /// Whether this error stops the session from starting.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::RequiredArtifact { .. } | Self::Config(_))
    }
}

pub type Result<T, E = ExplorerError> = std::result::Result<T, E>;
