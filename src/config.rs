use std::path::PathBuf;
use std::time::Duration;

use crate::errors::ClientError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TOKEN_FILE: &str = ".kb-session/token.json";
pub const DEFAULT_LOGIN_PATH: &str = "/login";
pub const DEFAULT_HOME_PATH: &str = "/";
pub const DEFAULT_IDENTITY_ENDPOINT: &str = "/api/auth/me";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const LOGIN_ENDPOINT: &str = "/api/auth/login";
pub const REGISTER_ENDPOINT: &str = "/api/auth/register";
pub const REGISTER_FROM_PARAMS_ENDPOINT: &str = "/api/auth/register-from-params";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub token_file: PathBuf,
    pub login_path: String,
    pub home_path: String,
    pub identity_endpoint: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token_file: PathBuf::from(DEFAULT_TOKEN_FILE),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            home_path: DEFAULT_HOME_PATH.to_string(),
            identity_endpoint: DEFAULT_IDENTITY_ENDPOINT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup; missing keys take defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ClientError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let timeout = match non_empty("KB_HTTP_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = raw
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| ClientError::configuration("KB_HTTP_TIMEOUT_SECS must be a valid integer"))?;
                if secs == 0 {
                    return Err(ClientError::configuration("KB_HTTP_TIMEOUT_SECS must be greater than zero"));
                }
                Duration::from_secs(secs)
            }
            None => defaults.timeout,
        };

        Ok(Self {
            base_url: non_empty("KB_API_BASE_URL").unwrap_or(defaults.base_url),
            token_file: non_empty("KB_TOKEN_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.token_file),
            login_path: non_empty("KB_LOGIN_PATH").unwrap_or(defaults.login_path),
            home_path: non_empty("KB_HOME_PATH").unwrap_or(defaults.home_path),
            identity_endpoint: non_empty("KB_IDENTITY_ENDPOINT").unwrap_or(defaults.identity_endpoint),
            timeout,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Endpoints whose 401 means "bad credentials", not "session expired".
    pub fn is_auth_endpoint(&self, endpoint: &str) -> bool {
        let path = endpoint_path(endpoint);
        path == endpoint_path(&self.identity_endpoint)
            || path == LOGIN_ENDPOINT
            || path == REGISTER_ENDPOINT
            || path == REGISTER_FROM_PARAMS_ENDPOINT
    }
}

/// Strip scheme/host and query so absolute and relative spellings compare equal.
fn endpoint_path(endpoint: &str) -> &str {
    let without_origin = match endpoint.split_once("://") {
        Some((_, rest)) => rest.find('/').map(|idx| &rest[idx..]).unwrap_or("/"),
        None => endpoint,
    };
    let without_query = without_origin.split(['?', '#']).next().unwrap_or(without_origin);
    match without_query.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    }
}
