use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Failures the transport client reports. Unparseable response bodies are
/// not among them; they come back as `None`.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{message}")]
    Http {
        status: u16,
        message: String,
        body: Option<Value>,
    },

    #[error("Network request failed")]
    Network(#[source] reqwest::Error),

    #[error("Request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("Invalid service URL: {0}")]
    InvalidUrl(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// Builds the error for a non-success status, preferring the server's
    /// own `detail` or `message`.
    pub fn from_status(status: reqwest::StatusCode, body: Option<Value>) -> Self {
        let message = body
            .as_ref()
            .and_then(|b| server_message(b.get("detail")).or_else(|| server_message(b.get("message"))))
            .unwrap_or_else(|| match status.canonical_reason() {
                Some(reason) => format!("Request failed ({} {})", status.as_u16(), reason),
                None => format!("Request failed ({})", status.as_u16()),
            });

        Self::Http {
            status: status.as_u16(),
            message,
            body,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

fn server_message(v: Option<&Value>) -> Option<String> {
    match v? {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(false) => None,
        other => Some(other.to_string()),
    }
}
