use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identity returned by the current-user endpoint.
///
/// Capability flags the server adds beyond `is_admin` and `can_manage_kb`
/// are kept in `extra` rather than dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    #[serde(default, rename = "username", alias = "display_name")]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub can_manage_kb: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    pub fn new(id: i64, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            email: None,
            is_admin: false,
            can_manage_kb: false,
            extra: Map::new(),
        }
    }

    pub fn with_admin(mut self, is_admin: bool) -> Self {
        self.is_admin = is_admin;
        self
    }

    pub fn with_kb_management(mut self, can_manage_kb: bool) -> Self {
        self.can_manage_kb = can_manage_kb;
        self
    }

    /// Look up an additional boolean capability flag, e.g. `is_active`.
    pub fn flag(&self, name: &str) -> bool {
        self.extra.get(name).and_then(Value::as_bool).unwrap_or(false)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub user: UserProfile,
    #[serde(default)]
    pub message: Option<String>,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct FirstUserCheck {
    pub is_first_user: bool,
}
