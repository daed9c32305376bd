use thiserror::Error;

use session::SessionError;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid response from server: {0}")]
    InvalidResponse(String),

    #[error("{0}")]
    Rejected(String),

    #[error("session expired, please log in again")]
    SessionExpired,

    #[error("not logged in")]
    NotLoggedIn,

    #[error("invalid session data: {0}")]
    Session(#[from] SessionError),
}

impl ClientError {
    /// Network-level failure where the request may not have reached the
    /// backend. Nothing is retried automatically.
    pub fn is_transient(&self) -> bool {
        matches!(self, ClientError::Http(_) | ClientError::Transport(_))
    }

    /// The user has to sign in again.
    pub fn requires_login(&self) -> bool {
        matches!(self, ClientError::SessionExpired | ClientError::NotLoggedIn)
    }
}
