//! Portcullis - role-based authorization with template-driven provisioning
//!
//! Decides whether an actor may perform an action on a resource, resolves
//! transitive role delegation, and reconciles the role/grant store against
//! named declarative templates.

pub mod authz;
pub mod entities;
pub mod errors;
pub mod settings;
pub mod store;
