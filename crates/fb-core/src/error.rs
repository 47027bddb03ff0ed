//! Error taxonomy for calls against the funnel backend.

use thiserror::Error;

/// Message shown when the backend rejects the session token.
pub const SESSION_EXPIRED: &str = "Session expired. Please login again.";

/// Errors returned by every backend call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// Network or transport failure (connect, timeout, broken body).
    #[error("transport error: {0}")]
    Transport(String),

    /// The backend answered 401. The session token has already been cleared
    /// by the time this error is returned.
    #[error("{}", SESSION_EXPIRED)]
    Unauthorized,

    /// Any other non-2xx response. `message` is the plain-text body.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// A 2xx response whose body did not match the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// Build a `Rejected` error from a status and raw body, falling back to a
    /// generic message when the body is blank.
    pub fn rejected(status: u16, body: &str) -> Self {
        let body = body.trim();
        let message = if body.is_empty() {
            format!("HTTP error! status: {status}")
        } else {
            body.to_string()
        };
        Self::Rejected { status, message }
    }

    /// Whether the user must sign in again before retrying.
    pub fn requires_login(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// HTTP status associated with the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized => Some(401),
            Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}
