use std::fmt;

use thiserror::Error;

use crate::windows::WindowId;

pub type Result<T> = std::result::Result<T, SessionError>;

/// Errors surfaced by the session layer.
///
/// `Connect` only occurs while establishing the display connection; once a
/// session is live, transport and protocol failures come back as `Display`.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("cannot reach the display service: {0}")]
    Connect(String),

    #[error("window id {0} is already open")]
    DuplicateId(WindowId),

    #[error("window id {0} is not open")]
    UnknownWindow(WindowId),

    #[error("display request failed: {0}")]
    Display(String),
}

impl SessionError {
    pub(crate) fn display(err: impl fmt::Display) -> Self {
        SessionError::Display(err.to_string())
    }
}
