//! Error taxonomy shared by the API client and the state containers.

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Remote unreachable, timed out, or returned an undecodable body.
    #[error("transport error: {0}")]
    Transport(String),

    /// Non-success status that is not one of the specific cases below.
    #[error("unexpected HTTP status {status}")]
    Status { status: u16 },

    #[error("not found")]
    NotFound,

    /// Duplicate vote for the same (user, news) pair.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("validation failed: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    Transport,
    NotFound,
    Conflict,
    Validation,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Transport(_) | ApiError::Status { .. } => ErrorKind::Transport,
            ApiError::NotFound => ErrorKind::NotFound,
            ApiError::Conflict(_) => ErrorKind::Conflict,
            ApiError::Validation(_) => ErrorKind::Validation,
        }
    }

    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            404 => ApiError::NotFound,
            409 => ApiError::Conflict(non_empty_or(body, "already voted")),
            400 | 422 => ApiError::Validation(non_empty_or(body, "rejected by server")),
            _ => ApiError::Status { status },
        }
    }
}

fn non_empty_or(body: &str, fallback: &str) -> String {
    let t = body.trim();
    if t.is_empty() {
        fallback.to_string()
    } else {
        t.chars().take(200).collect()
    }
}

/// Action label used for failed votes; a conflict under it means a duplicate vote.
pub const VOTE_ACTION: &str = "Failed to submit vote";
pub const DUPLICATE_VOTE_MESSAGE: &str = "You have already voted on this news item";

/// What a container exposes to the presentation layer after a failed action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorState {
    pub kind: ErrorKind,
    pub message: String,
}

impl ErrorState {
    /// `action` prefixes the message, e.g. "Failed to submit vote: ...".
    pub fn from_api(action: &str, err: &ApiError) -> Self {
        let message = match err {
            ApiError::Conflict(_) if action == VOTE_ACTION => DUPLICATE_VOTE_MESSAGE.to_string(),
            other => format!("{action}: {other}"),
        };
        Self {
            kind: err.kind(),
            message,
        }
    }
}
