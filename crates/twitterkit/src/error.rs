//! Error types for Twitter API operations.
//!
//! Errors are categorized so callers can tell transient network trouble
//! from problems that will not go away on their own (bad credentials,
//! unknown list).

use std::fmt;

/// Result type alias for Twitter API operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of API errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Network-related errors (transient, retryable).
    Network,
    /// Credentials rejected (401) or access denied (403).
    Auth,
    /// List or account not found.
    NotFound,
    /// Rate limit exceeded (429).
    RateLimited,
    /// Unparseable response.
    Format,
    /// Other/unknown errors.
    Other,
}

impl ErrorCategory {
    /// Category of a failed HTTP exchange; `None` means no response arrived.
    #[must_use]
    pub fn from_status(status: Option<u16>) -> Self {
        match status {
            None => Self::Network,
            Some(401 | 403) => Self::Auth,
            Some(404) => Self::NotFound,
            Some(429) => Self::RateLimited,
            Some(500..=599) => Self::Network,
            Some(_) => Self::Other,
        }
    }

    /// Whether this error category is typically transient.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network | Self::RateLimited)
    }

    /// Get a user-friendly description of this error category.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Network => "Network connectivity issue",
            Self::Auth => "Authentication failed",
            Self::NotFound => "List or account not found",
            Self::RateLimited => "Rate limit exceeded",
            Self::Format => "Invalid response format",
            Self::Other => "Unexpected error",
        }
    }

    /// Get actionable advice for resolving this error category.
    #[must_use]
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Network => "Check your internet connection; the next cycle will retry",
            Self::Auth => "Check the CK, CS, AT and ATS credentials",
            Self::NotFound => "Check LIST_ID and that the list belongs to the authenticated account",
            Self::RateLimited => "Increase the polling interval",
            Self::Format => "The API may have changed; check for a newer release",
            Self::Other => "Check the error details for more information",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Errors that can occur talking to the Twitter API.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request failed.
    #[error("HTTP request failed: {message}")]
    HttpError {
        /// Error message.
        message: String,
        /// HTTP status code if available.
        status: Option<u16>,
    },

    /// Invalid response from API.
    #[error("invalid API response: {0}")]
    InvalidResponse(String),

    /// Request could not be signed.
    #[error("OAuth signing failed: {0}")]
    Signing(String),

    /// Generic error.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an HTTP error.
    pub fn http(message: impl Into<String>, status: Option<u16>) -> Self {
        Self::HttpError {
            message: message.into(),
            status,
        }
    }

    /// HTTP status attached to the error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpError { status, .. } => *status,
            _ => None,
        }
    }

    /// Get the error category.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::HttpError { status, .. } => ErrorCategory::from_status(*status),
            Error::InvalidResponse(_) => ErrorCategory::Format,
            Error::Signing(_) | Error::Other(_) => ErrorCategory::Other,
        }
    }

    /// Whether this error is typically transient.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.category().is_retryable()
    }
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(code) => Self::HttpError {
                message: format!("HTTP {}", code),
                status: Some(code),
            },
            other => Self::HttpError {
                message: other.to_string(),
                status: None,
            },
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidResponse(err.to_string())
    }
}

impl From<Error> for reconcile::GatewayError {
    fn from(err: Error) -> Self {
        match err {
            Error::HttpError { message, status } => Self::Http { message, status },
            Error::InvalidResponse(message) => Self::InvalidResponse(message),
            other => Self::Other(other.to_string()),
        }
    }
}
