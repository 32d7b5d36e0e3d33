use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::Value;
use thiserror::Error;

/// Failures talking to the token endpoint.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{message}")]
    Upstream {
        status: Option<u16>,
        message: String,
    },
    #[error("No code verifier found for the given state")]
    UnknownState,
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Malformed token response: {0}")]
    MalformedResponse(String),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::Upstream { status, .. } => status_or_internal(*status),
            AuthError::UnknownState => StatusCode::BAD_REQUEST,
            AuthError::Network(_) | AuthError::MalformedResponse(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Failures talking to the GraphQL endpoint.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}")]
    Upstream {
        status: Option<u16>,
        message: String,
    },
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Malformed API response: {0}")]
    MalformedResponse(String),
    #[error("Upstream response is missing {0}")]
    MissingField(&'static str),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Upstream { status, .. } => status_or_internal(*status),
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error surfaced at the HTTP boundary.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Could not request token. {0}")]
    Token(#[from] AuthError),
    #[error("Could not query API. {0}")]
    Api(#[from] ApiError),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::Token(e) => e.status(),
            ProxyError::Api(e) => e.status(),
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = %status, error = %self, "request failed");
        } else {
            tracing::warn!(status = %status, error = %self, "request rejected");
        }
        (status, self.to_string()).into_response()
    }
}

/// First entry of a GraphQL-style `errors` array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamFailure {
    pub status: Option<u16>,
    pub message: String,
}

impl UpstreamFailure {
    /// Returns `None` when the body has no `errors` key or it is `null`.
    /// Any other `errors` value, including an empty list, is a failure.
    pub fn from_errors(body: &Value) -> Option<Self> {
        let first = match body.get("errors")? {
            Value::Null => return None,
            Value::Array(errors) => match errors.first() {
                Some(first) => first,
                None => {
                    return Some(Self {
                        status: None,
                        message: "Upstream returned an empty error list".to_string(),
                    });
                }
            },
            other => other,
        };
        let message = match first {
            Value::String(message) => message.clone(),
            _ => first
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("Unknown upstream error")
                .to_string(),
        };
        let status = first
            .pointer("/extensions/status")
            .and_then(Value::as_u64)
            .and_then(|s| u16::try_from(s).ok());
        Some(Self { status, message })
    }

    /// RFC 6749 section 5.2 style `{error, error_description}` bodies.
    pub fn from_oauth_error(body: &Value, http_status: u16) -> Option<Self> {
        let code = body.get("error")?.as_str()?;
        let message = body
            .get("error_description")
            .and_then(Value::as_str)
            .unwrap_or(code)
            .to_string();
        Some(Self {
            status: Some(http_status),
            message,
        })
    }

    /// Non-2xx reply that carried no recognised error payload.
    pub fn from_http_status(body: &Value, http_status: u16) -> Option<Self> {
        if (200..300).contains(&http_status) {
            return None;
        }
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Upstream responded with HTTP {http_status}"));
        Some(Self {
            status: Some(http_status),
            message,
        })
    }
}

impl From<UpstreamFailure> for AuthError {
    fn from(f: UpstreamFailure) -> Self {
        AuthError::Upstream {
            status: f.status,
            message: f.message,
        }
    }
}

impl From<UpstreamFailure> for ApiError {
    fn from(f: UpstreamFailure) -> Self {
        ApiError::Upstream {
            status: f.status,
            message: f.message,
        }
    }
}

fn status_or_internal(status: Option<u16>) -> StatusCode {
    status
        .and_then(|s| StatusCode::from_u16(s).ok())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}
