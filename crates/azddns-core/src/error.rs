//! Error types for the Azure DNS updater
//!
//! Errors fall into two groups. `Config`, `Credential` and `Startup` abort
//! initialization. `Network` and `Provider` are contained within a single
//! update cycle and never escape the scheduler.

use thiserror::Error;

/// Result type alias for updater operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the updater
#[derive(Error, Debug)]
pub enum Error {
    /// Identity provider rejected the client credentials or was unreachable
    #[error("Credential error: {0}")]
    Credential(String),

    /// External address lookup failed, timed out or returned no address
    #[error("Network error: {0}")]
    Network(String),

    /// DNS provider rejected the record update
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error detail reported by the provider
        message: String,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The first update cycle failed, so the updater never entered steady state
    #[error("Startup failed: {0}")]
    Startup(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a credential error
    pub fn credential(msg: impl Into<String>) -> Self {
        Self::Credential(msg.into())
    }

    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a startup error
    pub fn startup(msg: impl Into<String>) -> Self {
        Self::Startup(msg.into())
    }

    /// Whether this error must abort process startup
    pub fn is_fatal_at_startup(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::Credential(_) | Self::Startup(_)
        )
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
