use serde_json::Value;
use thiserror::Error;

use super::transport::{Response, TransportError};

/// Shown when a failure has no more specific message
pub const GENERIC_MESSAGE: &str = "Something went wrong. Please try again.";

/// Outcome of a failed API call.
///
/// Recognized statuses carry the server's `detail`; everything else is
/// [`ApiError::Unexpected`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("Bad request: {detail}")]
    BadRequest { detail: String },

    #[error("Unauthorized: {detail}")]
    Unauthorized { detail: String },

    #[error("Forbidden: {detail}")]
    Forbidden { detail: String },

    #[error("Not found: {detail}")]
    NotFound { detail: String },

    #[error("Conflict: {detail}")]
    Conflict { detail: String },

    #[error("Unexpected status {status}: {detail}")]
    Unexpected { status: u16, detail: String },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Invalid response body: {0}")]
    Decode(String),

    #[error("Not signed in")]
    NotAuthenticated,
}

impl ApiError {
    /// Map a non-2xx response to an error
    pub fn from_response(response: &Response) -> Self {
        let detail = detail_of(&response.body);
        match response.status {
            400 => ApiError::BadRequest { detail },
            401 => ApiError::Unauthorized { detail },
            403 => ApiError::Forbidden { detail },
            404 => ApiError::NotFound { detail },
            409 => ApiError::Conflict { detail },
            status => ApiError::Unexpected { status, detail },
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::BadRequest { .. } => Some(400),
            ApiError::Unauthorized { .. } => Some(401),
            ApiError::Forbidden { .. } => Some(403),
            ApiError::NotFound { .. } => Some(404),
            ApiError::Conflict { .. } => Some(409),
            ApiError::Unexpected { status, .. } => Some(*status),
            ApiError::Transport(_) | ApiError::Decode(_) | ApiError::NotAuthenticated => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }

    /// Text for an inline banner: the server's detail for recognized
    /// statuses, a generic message otherwise
    pub fn user_message(&self) -> String {
        match self {
            ApiError::BadRequest { detail }
            | ApiError::Unauthorized { detail }
            | ApiError::Forbidden { detail }
            | ApiError::NotFound { detail }
            | ApiError::Conflict { detail }
                if !detail.is_empty() =>
            {
                detail.clone()
            }
            ApiError::NotAuthenticated => "Please sign in again.".to_string(),
            _ => GENERIC_MESSAGE.to_string(),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Decode(e.to_string())
    }
}

/// Pull `detail` out of an error body.
///
/// The backend sends `{"detail": "..."}`, or a list of field errors for
/// rejected payloads; those are joined by their `msg`.
fn detail_of(body: &str) -> String {
    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) => return body.trim().to_string(),
    };
    match value.get("detail") {
        Some(Value::String(detail)) => detail.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.get("msg").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join("; "),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}
