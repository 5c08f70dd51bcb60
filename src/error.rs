//! Error type shared by every client operation.
//!
//! Each variant maps onto one of the user-facing failure classes: a missing
//! session sends the user back to login, network and API failures become a
//! transient error notice, and local validation failures stop an operation
//! before any request is sent.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PosError {
    /// No usable session in the credential store.
    #[error("Session missing or expired, please log in again")]
    SessionRequired,

    /// The request never produced an HTTP response.
    #[error("{0}")]
    Network(String),

    /// The API answered with a non-success status.
    #[error("{message} (HTTP {status})")]
    Api { status: u16, message: String },

    /// Local input was rejected before any request was made.
    #[error("{0}")]
    Validation(String),

    /// The API answered with a body we could not decode.
    #[error("Invalid response from API: {0}")]
    Decode(String),

    #[error("Credential store error: {0}")]
    Storage(String),
}

impl PosError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// True when the error was raised locally and no request was sent.
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::SessionRequired)
    }
}

impl From<serde_json::Error> for PosError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}

impl From<keyring::Error> for PosError {
    fn from(e: keyring::Error) -> Self {
        Self::Storage(e.to_string())
    }
}

pub type PosResult<T> = Result<T, PosError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display_includes_status() {
        let err = PosError::Api {
            status: 422,
            message: "field required".into(),
        };
        assert_eq!(err.to_string(), "field required (HTTP 422)");
    }

    #[test]
    fn local_errors_are_flagged() {
        assert!(PosError::validation("Cart is empty").is_local());
        assert!(PosError::SessionRequired.is_local());
        assert!(!PosError::Network("down".into()).is_local());
    }
}
