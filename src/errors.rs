use thiserror::Error;

use crate::semver::SemanticVersion;

/// Main error type for the tailwind-resolver crate
#[derive(Debug, Error)]
pub enum ResolverError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(
        "unsupported Tailwind CSS version {version}: only major versions {supported:?} are supported"
    )]
    UnsupportedVersion {
        version: SemanticVersion,
        supported: &'static [u64],
    },

    #[error("could not detect the installed Tailwind CSS version: {message}")]
    VersionDetection { message: String },

    #[error("failed to start worker process {program}: {message}")]
    WorkerSpawn { program: String, message: String },

    #[error("worker for `{operation}` exited before responding")]
    WorkerClosed { operation: String },

    #[error("worker for `{operation}` did not respond within {timeout_ms}ms")]
    BridgeTimeout { operation: String, timeout_ms: u64 },

    /// A computation failed inside the worker; the original message is
    /// carried back across the process boundary unchanged.
    #[error("{message}")]
    Worker { message: String },

    #[error("protocol error: {message}")]
    Protocol { message: String },

    #[error("configuration error: {message}")]
    Config { message: String },
}

pub type Result<T> = std::result::Result<T, ResolverError>;
