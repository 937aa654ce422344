//! Role-based authorization engine.
//!
//! Answers "may this actor perform this action on this resource?" from the
//! grant store, and reconciles the store against named templates. Role
//! delegation is encoded in the same grant table as resource rules (the
//! reserved `role` section) and is hidden behind the closure resolver;
//! callers never see the shared storage.

pub mod apply;
pub mod closure;
pub mod diff;
pub mod matcher;
pub mod registry;
pub mod template;

pub use apply::apply;
pub use closure::{closure_for_user, closure_from_role};
pub use diff::{diff, GrantKey, RoleDiff, RoleStatus};
pub use matcher::{is_allowed, role_check};
pub use registry::TemplateRegistry;
pub use template::{GrantDef, RoleDef, Template};
