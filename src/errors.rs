use serde_json::Value;

pub type ClientResult<T> = Result<T, ClientError>;

/// Message used when the server gives us nothing better to show.
pub const GENERIC_FAILURE_MESSAGE: &str = "request failed";

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(String),
    #[error("unauthorized: {0}")]
    Auth(String),
    #[error("validation error ({status}): {message}")]
    Validation { status: u16, message: String },
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ClientError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }

    pub fn validation(status: u16, message: impl Into<String>) -> Self {
        Self::Validation {
            status,
            message: message.into(),
        }
    }

    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Classify a non-2xx response. 401 is always `Auth`.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        match status {
            401 => Self::Auth(message.into()),
            400..=499 => Self::validation(status, message),
            _ => Self::server(status, message),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Auth(_) => Some(401),
            ClientError::Validation { status, .. } | ClientError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Text suitable for showing to the user, without the variant prefix.
    pub fn user_message(&self) -> &str {
        match self {
            ClientError::Network(message)
            | ClientError::Auth(message)
            | ClientError::Configuration(message)
            | ClientError::Storage(message)
            | ClientError::Decode(message)
            | ClientError::InvalidRequest(message) => message,
            ClientError::Validation { message, .. } | ClientError::Server { message, .. } => message,
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, ClientError::Auth(_))
    }
}

/// Pull a displayable message out of an error response body.
///
/// `detail` may be a plain string or an object carrying `message`. A JSON
/// body without a usable `detail` yields the generic message; a body that is
/// not JSON at all is returned as raw text.
pub fn extract_error_message(body: &[u8]) -> String {
    match serde_json::from_slice::<Value>(body) {
        Ok(value) => {
            let detail = value.get("detail");
            let message = match detail {
                Some(Value::String(text)) => Some(text.clone()),
                Some(Value::Object(map)) => map
                    .get("message")
                    .and_then(|m| m.as_str())
                    .map(str::to_string),
                _ => None,
            };
            message.unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string())
        }
        Err(_) => {
            let raw = String::from_utf8_lossy(body).trim().to_string();
            if raw.is_empty() {
                GENERIC_FAILURE_MESSAGE.to_string()
            } else {
                raw
            }
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_timeout() {
            Self::Network(format!("request timed out: {value}"))
        } else if value.is_decode() {
            Self::Decode(value.to_string())
        } else if value.is_builder() {
            Self::InvalidRequest(value.to_string())
        } else {
            Self::Network(value.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(value: serde_json::Error) -> Self {
        Self::Decode(value.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(value: std::io::Error) -> Self {
        Self::Storage(value.to_string())
    }
}
