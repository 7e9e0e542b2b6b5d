// Error taxonomy shared by the session store and the API client.
// The `Display` text of each variant is what the user sees, so it is
// worded as a user-facing message rather than a diagnostic.

use std::path::PathBuf;
use thiserror::Error;

/// Fallback shown for a 400 response that carries no `message` field.
pub const REJECTED_FALLBACK: &str = "Request was rejected by the server";

/// Everything an operation can fail with.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered 400 with a human-readable explanation.
    #[error("{0}")]
    Rejected(String),

    /// Register answered 400: the name is already taken.
    #[error("Username is occupied")]
    UsernameOccupied,

    /// Any other status, a malformed success body or a network failure.
    /// The cause is logged, never shown.
    #[error("Error has occurred. Try again")]
    Unavailable,

    /// An authenticated operation was invoked without a stored token.
    #[error("You are not logged in. Run \"login <username> <password>\" first")]
    NotLoggedIn,

    /// The session record could not be read or written.
    #[error("Session file {path:?} is unusable: {source}")]
    Session {
        path: PathBuf,
        #[source]
        source: SessionIoError,
    },
}

/// Underlying cause of a session persistence failure.
#[derive(Debug, Error)]
pub enum SessionIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid session record: {0}")]
    Format(#[from] serde_json::Error),
}

impl ClientError {
    pub(crate) fn session(path: impl Into<PathBuf>, source: impl Into<SessionIoError>) -> Self {
        ClientError::Session {
            path: path.into(),
            source: source.into(),
        }
    }
}

/// Failure to obtain any HTTP response at all.
#[derive(Debug, Error)]
#[error("transport failure: {0}")]
pub struct TransportError(pub String);

impl From<TransportError> for ClientError {
    fn from(err: TransportError) -> Self {
        tracing::debug!(error = %err, "request did not complete");
        ClientError::Unavailable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_facing_messages() {
        assert_eq!(
            ClientError::Rejected("no such room".into()).to_string(),
            "no such room"
        );
        assert_eq!(ClientError::UsernameOccupied.to_string(), "Username is occupied");
        assert_eq!(
            ClientError::Unavailable.to_string(),
            "Error has occurred. Try again"
        );
    }

    #[test]
    fn transport_failures_hide_their_cause() {
        let err: ClientError = TransportError("connection refused (os error 111)".into()).into();
        assert!(matches!(err, ClientError::Unavailable));
        assert!(!err.to_string().contains("refused"));
    }

    #[test]
    fn session_error_names_the_file() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = ClientError::session("/tmp/session.json", io);
        assert!(err.to_string().contains("session.json"));
    }
}
