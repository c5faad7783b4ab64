//! Transport adapter between the client and the OPAC REST backend.
//!
//! Every response, successful or not, is folded into [`ApiResult`]: the
//! backend envelope `{ success, data?, error? }` is unwrapped here so no
//! caller ever inspects HTTP status codes or raw bodies.

mod http;
mod memory;

pub use http::{HttpTransport, DEFAULT_BASE_URL};
pub use memory::{MemoryTransport, RecordedCall};

use std::fmt;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{ApiError, ApiResult, GENERIC_SERVER_ERROR};

/// HTTP verbs used by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
            Method::Patch => write!(f, "PATCH"),
            Method::Delete => write!(f, "DELETE"),
        }
    }
}

/// A way of reaching the backend.
///
/// `path` is relative to the API base (`/tasks?project_id=3`). Implementations
/// never panic and never leak transport-specific errors: everything comes
/// back as an [`ApiError`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn request(&self, method: Method, path: &str, body: Option<Value>) -> ApiResult<Value>;
}

/// Response body shared by every endpoint
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

/// Fold an HTTP status and raw body into the uniform result shape.
pub fn normalize_response(status: u16, body: &str) -> ApiResult<Value> {
    let envelope = serde_json::from_str::<Envelope>(body);

    if !(200..300).contains(&status) {
        let message = envelope
            .ok()
            .and_then(|e| e.error)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| GENERIC_SERVER_ERROR.to_string());
        return Err(ApiError::server(Some(status), message));
    }

    if body.trim().is_empty() {
        return Ok(Value::Null);
    }

    let envelope = envelope?;
    if !envelope.success {
        let message = envelope
            .error
            .unwrap_or_else(|| GENERIC_SERVER_ERROR.to_string());
        return Err(ApiError::server(Some(status), message));
    }
    Ok(envelope.data.unwrap_or(Value::Null))
}
