//! Error types shared by the webhook service and the simulator.

use thiserror::Error;

/// Result type alias for agent operations.
pub type Result<T> = std::result::Result<T, AgentError>;

/// Every failure the service can surface. The `Display` text is what ends up
/// in `{"error": ...}` response bodies.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Reading or writing the store, the notification log, or a payload file.
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Body or store document is not valid JSON.
    #[error("{0}")]
    Json(#[from] serde_json::Error),

    /// `config.yaml` could not be parsed.
    #[error("invalid config file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    /// JSON parsed but has a shape the dispatcher cannot work with.
    #[error("invalid webhook payload: {0}")]
    InvalidPayload(String),

    /// A writer panicked while holding the store or log lock.
    #[error("storage lock poisoned")]
    LockPoisoned,

    /// HTTP failure talking to the webhook service.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl AgentError {
    pub fn invalid_payload(message: impl Into<String>) -> Self {
        AgentError::InvalidPayload(message.into())
    }
}
