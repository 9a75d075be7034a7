//! Authorization - permission catalog, role map and checks
//!
//! This module decides what the current user may see and do on the client:
//! - A closed catalog of permission identifiers
//! - A closed `Role` enumeration with an exhaustive role→permission table
//! - `PermissionEngine::check`, a pure membership test against a session snapshot
//! - `Visibility`, the render-time binding used by UI adapters
//!
//! The server remains the authority; everything here only hides surfaces
//! that would be rejected server-side anyway.

mod binding;
mod engine;
mod permission;

pub use binding::{Visibility, VisibilityBinding};
pub use engine::PermissionEngine;
pub use permission::{Permission, Role, UnknownPermission};
