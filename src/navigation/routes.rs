use crate::authz::Permission;

/// Authorization metadata attached to a route.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteAuthPolicy {
    pub requires_auth: bool,
    pub requires_admin: bool,
    pub permission: Option<Permission>,
}

impl RouteAuthPolicy {
    pub fn open() -> Self {
        Self::default()
    }

    pub fn authenticated() -> Self {
        Self {
            requires_auth: true,
            ..Self::default()
        }
    }

    pub fn admin() -> Self {
        Self {
            requires_auth: true,
            requires_admin: true,
            permission: None,
        }
    }

    pub fn with_permission(mut self, permission: Permission) -> Self {
        self.permission = Some(permission);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub path: String,
    pub name: String,
    pub policy: RouteAuthPolicy,
}

impl Route {
    pub fn new(path: impl Into<String>, name: impl Into<String>, policy: RouteAuthPolicy) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            policy,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    /// The application's own pages.
    pub fn standard() -> Self {
        Self::new(vec![
            Route::new("/", "Chat", RouteAuthPolicy::authenticated()),
            Route::new("/knowledge-base", "KnowledgeBase", RouteAuthPolicy::authenticated()),
            Route::new(
                "/knowledge-base/new",
                "NewKnowledgeBase",
                RouteAuthPolicy::authenticated().with_permission(Permission::KbCreate),
            ),
            Route::new("/admin", "Admin", RouteAuthPolicy::admin()),
            Route::new("/login", "Login", RouteAuthPolicy::open()),
            Route::new("/register", "Register", RouteAuthPolicy::open()),
        ])
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Exact match on the path, ignoring query, fragment and trailing slash.
    pub fn find(&self, path: &str) -> Option<&Route> {
        let wanted = normalize(path);
        self.routes.iter().find(|route| normalize(&route.path) == wanted)
    }
}

fn normalize(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    }
}
