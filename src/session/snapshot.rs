use crate::models::UserProfile;

/// Owned copy of the session taken under a single lock.
///
/// Authentication and the admin/KB flags are derived from `user`, so a
/// snapshot can never claim to be authenticated without a user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    pub token: Option<String>,
    pub user: Option<UserProfile>,
}

impl SessionSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.user.as_ref().map(|u| u.is_admin).unwrap_or(false)
    }

    pub fn can_manage_kb(&self) -> bool {
        self.user.as_ref().map(|u| u.can_manage_kb).unwrap_or(false)
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.token.is_none() && self.user.is_none()
    }
}
