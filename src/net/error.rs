//! Request failure taxonomy.
//!
//! ERROR HANDLING
//! ==============
//! Every failure a collaborator can produce maps onto one `ApiError` variant.
//! `CredentialRejected` is the only variant that carries session side
//! effects, and only on the authenticated channel.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use std::time::Duration;

use super::types::ApiErrorBody;

/// Status the backend uses to reject a bearer credential.
pub const STATUS_UNAUTHORIZED: u16 = 401;

/// Errors produced by HTTP collaborators.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The server rejected the presented credential.
    #[error("credential rejected")]
    CredentialRejected { body: Option<ApiErrorBody> },

    /// The server answered with a non-success status.
    #[error("request failed with status {status}")]
    Status { status: u16, body: Option<ApiErrorBody> },

    /// The request never produced a response.
    #[error("network error: {0}")]
    Transport(String),

    /// The request exceeded the client-side timeout.
    #[error("request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// The response could not be decoded.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl ApiError {
    /// Classify a non-success response.
    #[must_use]
    pub fn from_status(status: u16, raw_body: &str) -> Self {
        let body = ApiErrorBody::parse(raw_body);
        if status == STATUS_UNAUTHORIZED {
            Self::CredentialRejected { body }
        } else {
            Self::Status { status, body }
        }
    }

    /// HTTP status carried by the failure, if a response was received.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::CredentialRejected { .. } => Some(STATUS_UNAUTHORIZED),
            Self::Status { status, .. } => Some(*status),
            Self::Transport(_) | Self::Timeout(_) | Self::Malformed(_) => None,
        }
    }

    #[must_use]
    pub fn is_credential_rejected(&self) -> bool {
        matches!(self, Self::CredentialRejected { .. })
    }

    /// Unreachable, timed out or undecodable, as opposed to an explicit answer.
    #[must_use]
    pub fn is_transport_failure(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Timeout(_) | Self::Malformed(_))
    }

    /// Human-readable reason for display.
    ///
    /// Order: body `detail`, body `message`, the error text, then `fallback`.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        let body = match self {
            Self::CredentialRejected { body } | Self::Status { body, .. } => body.as_ref(),
            Self::Transport(_) | Self::Timeout(_) | Self::Malformed(_) => None,
        };
        if let Some(reason) = body.and_then(ApiErrorBody::reason) {
            return reason.to_owned();
        }
        let text = self.to_string();
        if text.trim().is_empty() { fallback.to_owned() } else { text }
    }
}
