//! # Registry Permissions
//!
//! This crate provides the permission model for the package registry,
//! shared between the auth pipeline and the publish/edit request handlers.
//!
//! ## Overview
//!
//! The registry-permissions crate handles:
//! - **Actions**: The operations a token can authorize (publish, edit)
//! - **Permissions**: Action + resource-pattern grants over namespaces
//! - **Matching**: Wildcard resource-pattern matching
//! - **Deny-list**: Namespace roots barred from non-global grants
//!
//! ## Architecture
//!
//! ```text
//! Permission = Action + Resource Pattern
//!
//! Examples:
//!   "io.github.alice/*"   - Any package under alice's GitHub namespace
//!   "com.example/*"       - Any package under the example.com namespace
//!   "com.example.*"       - Any package under example.com subdomains
//!   "*"                   - Any package anywhere (global grant)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use registry_permissions::{has_permission, Action, Permission};
//!
//! let perms = vec![Permission::publish("io.github.alice/*")];
//!
//! assert!(has_permission("io.github.alice/server", Action::Publish, &perms));
//! assert!(!has_permission("io.github.mallory/server", Action::Publish, &perms));
//! assert!(!has_permission("io.github.alice/server", Action::Edit, &perms));
//! ```
//!
//! ## Deny-list
//!
//! The deny-list is an injected, read-mostly configuration value consulted
//! at token issuance. A permission set containing the global `"*"` pattern
//! bypasses the deny-list entirely; otherwise the namespace root of every
//! pattern must be absent from the list or issuance fails as a whole.

pub mod actions;
pub mod denylist;
pub mod permissions;

// Re-export main types for convenience
pub use actions::Action;
pub use denylist::DenyList;
pub use permissions::{has_permission, namespace_root, pattern_matches, Permission};
