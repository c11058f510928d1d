use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScopeError {
    /// Missing or malformed user input. Never reaches the network.
    #[error("{0}")]
    Validation(String),

    #[error("Could not reach {endpoint}: {reason}")]
    Network { endpoint: String, reason: String },

    /// The server answered, but said no.
    #[error("{message}")]
    Application { endpoint: String, message: String },

    #[error("An analysis run is already in progress for {target}")]
    RunInProgress { target: String },

    #[error("Analysis run was cancelled")]
    Cancelled,

    #[error("Cannot move analysis from {from} to {to}")]
    InvalidTransition {
        from: &'static str,
        to: &'static str,
    },

    #[error("Export to {path} failed: {source}")]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScopeError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    pub fn is_application(&self) -> bool {
        matches!(self, Self::Application { .. })
    }

    /// Text suitable for a notification.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network { .. } => {
                "Could not reach the server. Please check your connection and try again.".to_string()
            }
            Self::Application { message, .. } => message.clone(),
            Self::Validation(message) => message.clone(),
            Self::RunInProgress { .. } => "Analysis is already running.".to_string(),
            Self::Cancelled => "Analysis was cancelled.".to_string(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScopeError>;
