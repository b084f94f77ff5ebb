//! Error types for the vplyer client core.

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the backend or driving playback.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested entity does not exist on the backend (HTTP 404).
    #[error("not found")]
    NotFound,

    /// The backend rejected the credentials for this call (HTTP 401/403).
    ///
    /// Persistence and resume callers treat this as "anonymous", never as a
    /// session-fatal condition.
    #[error("unauthorized")]
    Unauthorized,

    /// The backend answered with an unexpected status.
    #[error("backend returned {status}: {detail}")]
    Backend { status: u16, detail: String },

    /// Transport-level failure (DNS, connect, timeout, body read).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response body did not match the expected shape.
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl Error {
    /// Create a backend error from a status code and response detail.
    pub fn backend(status: u16, detail: impl Into<String>) -> Self {
        Self::Backend {
            status,
            detail: detail.into(),
        }
    }

    /// True when the failure is worth retrying on the next natural trigger
    /// (poll tick, save window) rather than surfacing to the user.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Backend { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
