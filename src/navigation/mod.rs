//! Route authorization.
//!
//! [`NavigationGuard`] decides a single navigation from one session
//! snapshot. [`Router`] wraps it so that a view can only be mounted from a
//! [`Resolution::Mount`], which exists only after the guard has run.

mod guard;
mod routes;

pub use guard::{GuardOutcome, NavigationGuard};
pub use routes::{Route, RouteAuthPolicy, RouteTable};

use crate::session::SessionStore;

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The guard let the navigation through; the route may render.
    Mount(Route),
    /// The guard sent the user elsewhere.
    Redirect { outcome: GuardOutcome, to: String },
    /// No route matches; nothing to authorize and nothing to mount.
    NotFound { path: String },
}

#[derive(Debug, Clone)]
pub struct Router {
    table: RouteTable,
    guard: NavigationGuard,
    store: SessionStore,
    login_path: String,
    home_path: String,
}

impl Router {
    pub fn new(
        table: RouteTable,
        store: SessionStore,
        login_path: impl Into<String>,
        home_path: impl Into<String>,
    ) -> Self {
        Self {
            table,
            guard: NavigationGuard::new(),
            store,
            login_path: login_path.into(),
            home_path: home_path.into(),
        }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn navigate(&self, path: &str) -> Resolution {
        let Some(route) = self.table.find(path) else {
            tracing::debug!(path, "no route matches");
            return Resolution::NotFound {
                path: path.to_string(),
            };
        };

        let snapshot = self.store.snapshot();
        match self.guard.evaluate(&route.policy, &snapshot) {
            GuardOutcome::Proceed => Resolution::Mount(route.clone()),
            outcome @ GuardOutcome::RedirectLogin => Resolution::Redirect {
                outcome,
                to: self.login_path.clone(),
            },
            outcome @ GuardOutcome::RedirectHome => Resolution::Redirect {
                outcome,
                to: self.home_path.clone(),
            },
        }
    }
}
