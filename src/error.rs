//! Error types for the council framework

use thiserror::Error;

/// Result type alias for council operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the council framework
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error (no agents available, missing credential, bad template)
    #[error("Configuration error: {0}")]
    Config(String),

    /// A single agent's remote call failed
    #[error("Agent error: {model}: {message}")]
    Agent { model: String, message: String },

    /// The master synthesis call failed outright
    #[error("Synthesis error: {0}")]
    Synthesis(String),

    /// HTTP request error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Output storage error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an agent error carrying the agent's identity
    pub fn agent(model: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Agent {
            model: model.into(),
            message: message.into(),
        }
    }

    /// Create a synthesis error
    pub fn synthesis(msg: impl Into<String>) -> Self {
        Self::Synthesis(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an other error
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}
