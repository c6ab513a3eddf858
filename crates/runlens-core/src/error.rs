// Error types for timeline reconstruction

use thiserror::Error;

/// Result type alias for timeline operations
pub type Result<T> = std::result::Result<T, TimelineError>;

/// Errors that can occur while fetching histories and assembling timelines
#[derive(Debug, Error)]
pub enum TimelineError {
    /// The engine reports no such execution
    #[error("Workflow execution not found: {0}")]
    NotFound(String),

    /// Any other non-success response from the engine API
    #[error("Upstream engine error (status {status}): {message}")]
    Upstream { status: u16, message: String },

    /// Transport-level failure talking to the engine (connect, timeout)
    #[error("HTTP error: {0}")]
    Http(String),

    /// The engine responded with a body we could not decode
    #[error("Response decode error: {0}")]
    Decode(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl TimelineError {
    /// Create a not-found error for a workflow id
    pub fn not_found(workflow_id: impl Into<String>) -> Self {
        TimelineError::NotFound(workflow_id.into())
    }

    /// Create an upstream error carrying the engine's status code
    pub fn upstream(status: u16, message: impl Into<String>) -> Self {
        TimelineError::Upstream {
            status,
            message: message.into(),
        }
    }

    /// Create a transport error
    pub fn http(message: impl Into<String>) -> Self {
        TimelineError::Http(message.into())
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        TimelineError::Decode(message.into())
    }
}
