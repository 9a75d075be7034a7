use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Every capability identifier the client knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    #[serde(rename = "kb:view")]
    KbView,
    #[serde(rename = "kb:create")]
    KbCreate,
    #[serde(rename = "kb:edit")]
    KbEdit,
    #[serde(rename = "kb:delete")]
    KbDelete,
    #[serde(rename = "doc:view")]
    DocView,
    #[serde(rename = "doc:create")]
    DocCreate,
    #[serde(rename = "doc:edit")]
    DocEdit,
    #[serde(rename = "doc:delete")]
    DocDelete,
}

impl Permission {
    pub const ALL: [Permission; 8] = [
        Permission::KbView,
        Permission::KbCreate,
        Permission::KbEdit,
        Permission::KbDelete,
        Permission::DocView,
        Permission::DocCreate,
        Permission::DocEdit,
        Permission::DocDelete,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Permission::KbView => "kb:view",
            Permission::KbCreate => "kb:create",
            Permission::KbEdit => "kb:edit",
            Permission::KbDelete => "kb:delete",
            Permission::DocView => "doc:view",
            Permission::DocCreate => "doc:create",
            Permission::DocEdit => "doc:edit",
            Permission::DocDelete => "doc:delete",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown permission: {0}")]
pub struct UnknownPermission(pub String);

impl FromStr for Permission {
    type Err = UnknownPermission;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .into_iter()
            .find(|permission| permission.as_str() == s)
            .ok_or_else(|| UnknownPermission(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

const ADMIN_PERMISSIONS: &[Permission] = &Permission::ALL;

const USER_PERMISSIONS: &[Permission] = &[Permission::DocView];

impl Role {
    pub fn from_admin_flag(is_admin: bool) -> Self {
        if is_admin {
            Role::Admin
        } else {
            Role::User
        }
    }

    pub fn permissions(self) -> &'static [Permission] {
        match self {
            Role::Admin => ADMIN_PERMISSIONS,
            Role::User => USER_PERMISSIONS,
        }
    }

    pub fn grants(self, permission: Permission) -> bool {
        self.permissions().contains(&permission)
    }
}
