//! Backend error taxonomy.
//!
//! Status classification lives here so every call site agrees on what a
//! 401 means. Only [`ApiError::Unauthorized`] signals an expired session.

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// HTTP 401: no valid session.
    #[error("unauthorized")]
    Unauthorized,

    /// Any other 4xx.
    #[error("request rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    /// 5xx or an unexpected status.
    #[error("backend error: status {status}")]
    Server { status: u16 },

    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("response decode failed: {0}")]
    Decode(String),

    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default, alias = "error")]
    message: Option<String>,
}

impl ApiError {
    /// Classify a non-success status and its body.
    #[must_use]
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            401 => Self::Unauthorized,
            400..=499 => Self::Rejected { status, message: error_message(body) },
            _ => Self::Server { status },
        }
    }

    /// True when the backend reported the session as expired or absent.
    #[must_use]
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// True when a login attempt was refused because of what the user typed,
    /// as opposed to the backend being unreachable or failing.
    #[must_use]
    pub fn is_credential_rejection(&self) -> bool {
        matches!(self, Self::Unauthorized | Self::Rejected { status: 400 | 403 | 404 | 422, .. })
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_else(|| body.trim().chars().take(200).collect())
}
