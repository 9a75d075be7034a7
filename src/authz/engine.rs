use crate::session::SessionSnapshot;

use super::permission::{Permission, Role};

/// Evaluates permissions against one session snapshot.
///
/// Evaluation order:
/// 1. no user -> deny
/// 2. role from `is_admin` -> membership in that role's table
///
/// Identifiers outside the catalog are denied.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissionEngine;

impl PermissionEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn check(&self, session: &SessionSnapshot, permission: Permission) -> bool {
        let Some(user) = session.user.as_ref() else {
            tracing::debug!(permission = %permission, "no user, permission denied");
            return false;
        };

        let role = Role::from_admin_flag(user.is_admin);
        let granted = role.grants(permission);
        tracing::debug!(
            user_id = user.id,
            role = ?role,
            permission = %permission,
            granted,
            "permission check"
        );
        granted
    }

    /// Check a raw identifier, e.g. one read from route metadata.
    pub fn check_str(&self, session: &SessionSnapshot, permission: &str) -> bool {
        match permission.parse::<Permission>() {
            Ok(permission) => self.check(session, permission),
            Err(err) => {
                tracing::warn!(error = %err, "unknown permission, denied");
                false
            }
        }
    }
}
