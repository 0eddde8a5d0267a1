//! Error types for reconciliation.
//!
//! Gateway failures are wrapped according to where they happened: a
//! [`FetchError`] aborts the cycle, an [`ApplyError`] only fails its own
//! direction.

use crate::types::{ApplyStatus, Direction};

/// Failure reported by a [`ListGateway`](crate::ListGateway) implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// HTTP or connection failure.
    #[error("HTTP request failed: {message}")]
    Http {
        /// Error message.
        message: String,
        /// HTTP status code if available.
        status: Option<u16>,
    },

    /// The service answered with a body we could not interpret.
    #[error("invalid API response: {0}")]
    InvalidResponse(String),

    /// Generic error.
    #[error("{0}")]
    Other(String),
}

impl GatewayError {
    /// Create an HTTP error.
    pub fn http(message: impl Into<String>, status: Option<u16>) -> Self {
        Self::Http {
            message: message.into(),
            status,
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }

    /// HTTP status attached to the failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => *status,
            _ => None,
        }
    }

    /// Whether the failure is likely transient (connection problems, 5xx, 429).
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http { status: None, .. } => true,
            Self::Http {
                status: Some(code), ..
            } => *code == 429 || *code >= 500,
            _ => false,
        }
    }
}

/// Failure to fetch one of the two sets. Aborts the cycle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("failed to fetch reference set: {0}")]
    ReferenceSet(#[source] GatewayError),

    #[error("failed to fetch list members: {0}")]
    Members(#[source] GatewayError),
}

impl FetchError {
    pub fn gateway_error(&self) -> &GatewayError {
        match self {
            Self::ReferenceSet(e) | Self::Members(e) => e,
        }
    }
}

/// Failure of a single batch apply call. Never aborts the sibling direction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApplyError {
    /// The call did not complete.
    #[error("{direction} failed: {source}")]
    Transport {
        direction: Direction,
        #[source]
        source: GatewayError,
    },

    /// The call completed with a non-success status.
    #[error("{direction} failed: status {status}")]
    Rejected {
        direction: Direction,
        status: ApplyStatus,
    },
}

impl ApplyError {
    pub fn direction(&self) -> Direction {
        match self {
            Self::Transport { direction, .. } | Self::Rejected { direction, .. } => *direction,
        }
    }
}
