use crate::session::SessionStore;

use super::engine::PermissionEngine;
use super::permission::Permission;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Shown,
    Hidden,
}

impl Visibility {
    pub fn is_shown(self) -> bool {
        matches!(self, Visibility::Shown)
    }
}

/// Render-time permission binding for a UI element.
///
/// A UI adapter calls [`VisibilityBinding::evaluate`] on every render of the
/// owning component and omits the element when it returns `Hidden`. Nothing
/// is cached between renders, so a login or logout takes effect on the next
/// render.
#[derive(Debug, Clone)]
pub struct VisibilityBinding {
    permission: Permission,
    engine: PermissionEngine,
}

impl VisibilityBinding {
    pub fn new(permission: Permission) -> Self {
        Self {
            permission,
            engine: PermissionEngine::new(),
        }
    }

    pub fn permission(&self) -> Permission {
        self.permission
    }

    pub fn evaluate(&self, store: &SessionStore) -> Visibility {
        if self.engine.check(&store.snapshot(), self.permission) {
            Visibility::Shown
        } else {
            Visibility::Hidden
        }
    }
}
