use crate::authz::PermissionEngine;
use crate::session::SessionSnapshot;

use super::routes::RouteAuthPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
    Proceed,
    RedirectLogin,
    RedirectHome,
}

/// Pre-transition check. Every evaluation ends in exactly one outcome.
///
/// Evaluation order:
/// 1. auth required and no token -> login
/// 2. admin required and user is not admin -> home
/// 3. declared permission not granted -> home
/// 4. proceed
#[derive(Debug, Clone, Copy, Default)]
pub struct NavigationGuard {
    engine: PermissionEngine,
}

impl NavigationGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn evaluate(&self, policy: &RouteAuthPolicy, session: &SessionSnapshot) -> GuardOutcome {
        let outcome = if policy.requires_auth && !session.has_token() {
            GuardOutcome::RedirectLogin
        } else if policy.requires_admin && !session.is_admin() {
            GuardOutcome::RedirectHome
        } else if policy
            .permission
            .is_some_and(|permission| !self.engine.check(session, permission))
        {
            GuardOutcome::RedirectHome
        } else {
            GuardOutcome::Proceed
        };

        tracing::debug!(
            requires_auth = policy.requires_auth,
            requires_admin = policy.requires_admin,
            permission = ?policy.permission,
            outcome = ?outcome,
            "navigation guard"
        );
        outcome
    }
}
