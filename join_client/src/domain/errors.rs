use crate::domain::identity::DisplayNameError;
use crate::domain::room_code::FormatError;

/// Failure of one join attempt. Every variant is scoped to the attempt and
/// recoverable by retrying or by entering a different code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JoinError {
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    DisplayName(#[from] DisplayNameError),
    #[error("anonymous sign-in failed: {0}")]
    Authentication(String),
    #[error("room code not found or expired")]
    RoomNotFound,
    #[error("room is at capacity")]
    RoomFull,
    // The backend no longer accepts the session that was sent.
    #[error("session rejected by the backend")]
    SessionRejected,
    #[error("join request failed: {0}")]
    Unavailable(String),
}

impl JoinError {
    /// Human-readable message; raw backend payloads never reach the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            JoinError::Format(err) => err.user_message(),
            JoinError::DisplayName(err) => err.user_message(),
            JoinError::Authentication(_) => "Failed to authenticate anonymously",
            JoinError::RoomNotFound => "Invalid or expired room code",
            JoinError::RoomFull => "Room is full",
            JoinError::SessionRejected => "Your session has expired. Please try again",
            JoinError::Unavailable(_) => "Failed to join room. Please try again",
        }
    }

    // Unknown/expired codes and full rooms need user action, not a resubmit.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            JoinError::Authentication(_) | JoinError::SessionRejected | JoinError::Unavailable(_)
        )
    }
}

/// Failure talking to the backend, before it is classified for the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("backend transport error: {0}")]
    Transport(String),
    #[error("backend upstream error {status}: {}", message.as_deref().unwrap_or("no message"))]
    Upstream { status: u16, message: Option<String> },
    #[error("backend response decode error: {0}")]
    Decode(String),
}

impl BackendError {
    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("session storage error: {0}")]
pub struct StorageError(pub String);
