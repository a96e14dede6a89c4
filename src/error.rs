//! Failure taxonomy for one upload cycle.
//!
//! Every variant is terminal for the cycle that produced it: nothing is
//! retried automatically and the user has to start over.

use thiserror::Error;

/// Coarse classification of a [`Failure`], useful for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    ValidationError,
    TransportError,
    ApplicationError,
}

/// Why an upload cycle ended without a result.
///
/// `Display` yields the text shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Failure {
    /// Local pre-flight check failed; no request was sent.
    #[error("{0}")]
    Validation(String),

    /// Non-2xx status, network failure, timeout, or an unusable body.
    #[error("{detail}")]
    Transport { status: Option<u16>, detail: String },

    /// The service answered 2xx but reported `success: false`.
    #[error("{0}")]
    Application(String),
}

impl Failure {
    pub fn kind(&self) -> FailureKind {
        match self {
            Failure::Validation(_) => FailureKind::ValidationError,
            Failure::Transport { .. } => FailureKind::TransportError,
            Failure::Application(_) => FailureKind::ApplicationError,
        }
    }

    /// Transport failure for a non-2xx HTTP status.
    pub fn http_status(status: u16) -> Self {
        Failure::Transport {
            status: Some(status),
            detail: format!("HTTP error! status: {}", status),
        }
    }

    /// Transport failure that never produced a status (connection refused, timeout).
    pub fn network(err: impl std::fmt::Display) -> Self {
        Failure::Transport {
            status: None,
            detail: format!("Request failed: {}", err),
        }
    }

    /// HTTP status carried by a transport failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Failure::Transport { status, .. } => *status,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_detail() {
        let failure = Failure::http_status(500);
        assert_eq!(failure.kind(), FailureKind::TransportError);
        assert_eq!(failure.status(), Some(500));
        assert_eq!(failure.to_string(), "HTTP error! status: 500");
    }

    #[test]
    fn test_application_message_is_verbatim() {
        let failure = Failure::Application("Unsupported encoding".to_string());
        assert_eq!(failure.kind(), FailureKind::ApplicationError);
        assert_eq!(failure.to_string(), "Unsupported encoding");
        assert_eq!(failure.status(), None);
    }

    #[test]
    fn test_network_has_no_status() {
        let failure = Failure::network("connection refused");
        assert_eq!(failure.status(), None);
        assert_eq!(failure.to_string(), "Request failed: connection refused");
    }
}
