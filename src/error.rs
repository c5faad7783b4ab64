//! Error taxonomy shared by the transport, the synchronizer and the boards.
//!
//! Every fallible library call returns [`ApiResult`]. Network failures and
//! server-reported failures end up in the same shape so callers never branch
//! on "exception vs. return value".

use std::fmt;

/// Uniform result of every backend call: `Ok(data)` or `Err(error)`.
pub type ApiResult<T> = Result<T, ApiError>;

/// Message used when a failed response carries no usable error text.
pub const GENERIC_SERVER_ERROR: &str = "Server error";

/// Kind of entity an in-flight claim refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Project,
    Task,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Project => write!(f, "Project"),
            EntityKind::Task => write!(f, "Task"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// No response was received (connection refused, timeout, broken body)
    #[error("network error: {0}")]
    Network(String),

    /// The backend answered but reported a failure
    #[error("{message}")]
    Server {
        status: Option<u16>,
        message: String,
    },

    /// The backend answered with a body we could not understand
    #[error("invalid response: {0}")]
    Decode(String),

    /// Another request for the same entity has not settled yet
    #[error("{kind} {id} already has a request in flight")]
    InFlight { kind: EntityKind, id: i64 },

    /// Client-side validation refused the input before any call was made
    #[error("{0}")]
    Invalid(String),
}

impl ApiError {
    pub fn server(status: Option<u16>, message: impl Into<String>) -> Self {
        ApiError::Server {
            status,
            message: message.into(),
        }
    }

    /// HTTP status of a server-reported failure, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Server { status, .. } => *status,
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}
