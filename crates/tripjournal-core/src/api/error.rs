use reqwest::StatusCode;
use thiserror::Error;

/// Opaque failure reported by a [`Transport`](super::Transport).
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Authentication required - log in or register first")]
    AuthenticationRequired,

    #[error("Invalid request: {0}")]
    RequestConstruction(String),

    #[error("Network error: {0}")]
    Transport(#[source] TransportError),

    #[error("Service returned {status}: {}", truncate_body(.body))]
    Service { status: StatusCode, body: String },

    #[error("Invalid response at `{path}`: {message}")]
    Decode { path: String, message: String },
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Truncate a response body to avoid printing excessive data
fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY_LENGTH {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY_LENGTH;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
}

impl ApiError {
    pub fn from_status(status: StatusCode, body: &[u8]) -> Self {
        ApiError::Service {
            status,
            body: String::from_utf8_lossy(body).into_owned(),
        }
    }

    /// HTTP status of a service error, if this is one
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Service { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The service rejected the credentials or the token has expired
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }
}
