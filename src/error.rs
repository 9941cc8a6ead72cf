//! Error types for the search client.

use serde::Deserialize;
use thiserror::Error;

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, SearchError>;

/// Main error type for search service operations
#[derive(Error, Debug)]
pub enum SearchError {
    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Authentication and credential errors
    #[error("Authentication failed: {message}")]
    Auth { message: String },

    /// API errors returned by the search service
    #[error("API error (status {status}{}): {message}", code_suffix(.code))]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Index definition rejected before it was sent
    #[error("Invalid index schema: {message}")]
    Schema { message: String },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Generic errors
    #[error("Error: {message}")]
    Generic { message: String },
}

/// Error envelope returned by the service: `{"error": {"code": .., "message": ..}}`
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

fn code_suffix(code: &Option<String>) -> String {
    code.as_deref()
        .map(|c| format!(", code {c}"))
        .unwrap_or_default()
}

impl SearchError {
    /// Create a new authentication error
    pub fn auth<S: Into<String>>(message: S) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new schema error
    pub fn schema<S: Into<String>>(message: S) -> Self {
        Self::Schema {
            message: message.into(),
        }
    }

    /// Create a new generic error
    pub fn generic<S: Into<String>>(message: S) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// Build an error from a non-success HTTP status and its body.
    ///
    /// The body is decoded as the service error envelope when possible and
    /// kept verbatim otherwise.
    pub fn from_response(status: u16, body: &str) -> Self {
        let (code, message) = match serde_json::from_str::<ErrorEnvelope>(body) {
            Ok(envelope) => (
                envelope.error.code.filter(|c| !c.is_empty()),
                envelope.error.message.unwrap_or_default(),
            ),
            Err(_) => (None, body.trim().to_string()),
        };

        match status {
            401 | 403 => {
                let detail = if message.is_empty() {
                    "check the API key or the role assignments of the identity".to_string()
                } else {
                    message
                };
                Self::auth(format!("status {status}: {detail}"))
            }
            400 => Self::Api {
                status,
                code,
                message: format!("Bad Request: {message}"),
            },
            _ => Self::Api {
                status,
                code,
                message,
            },
        }
    }

    /// HTTP status of a service error, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether the service reported that the resource does not exist.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_envelope_is_decoded() {
        let body = r#"{"error":{"code":"InvalidRequestParameter","message":"The field 'Tags' is not sortable."}}"#;
        let err = SearchError::from_response(400, body);

        match err {
            SearchError::Api {
                status,
                code,
                message,
            } => {
                assert_eq!(status, 400);
                assert_eq!(code.as_deref(), Some("InvalidRequestParameter"));
                assert_eq!(message, "Bad Request: The field 'Tags' is not sortable.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_plain_body_is_kept() {
        let err = SearchError::from_response(503, "  Service Unavailable\n");
        assert!(matches!(err, SearchError::Api { status: 503, .. }));
        assert_eq!(
            err.to_string(),
            "API error (status 503): Service Unavailable"
        );
    }

    #[test]
    fn test_forbidden_maps_to_auth() {
        let err = SearchError::from_response(403, "");
        assert!(matches!(err, SearchError::Auth { .. }));
        assert!(err.to_string().contains("role assignments"));
    }

    #[test]
    fn test_not_found() {
        let body = r#"{"error":{"code":"","message":"No index with the name 'missing' was found in the service."}}"#;
        let err = SearchError::from_response(404, body);
        assert!(err.is_not_found());
        assert_eq!(
            err.to_string(),
            "API error (status 404): No index with the name 'missing' was found in the service."
        );
    }
}
