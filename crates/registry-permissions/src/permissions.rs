//! # Permissions
//!
//! Core permission type and the wildcard matching rule used to authorize
//! publish and edit requests against a namespaced resource name.

use serde::{Deserialize, Serialize};

use crate::actions::Action;

/// A grant of one action over a resource pattern.
///
/// Resource patterns name a package namespace and match either exactly,
/// via a trailing `*` wildcard, or globally via `"*"`:
///
/// # Example
///
/// ```
/// use registry_permissions::{Action, Permission};
///
/// let perm = Permission::publish("io.github.alice/*");
/// assert!(perm.grants(Action::Publish, "io.github.alice/server"));
/// assert!(!perm.grants(Action::Edit, "io.github.alice/server"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Permission {
    /// The action this permission allows.
    pub action: Action,
    /// The resource pattern the action is allowed on.
    pub resource_pattern: String,
}

impl Permission {
    /// Create a new permission.
    pub fn new(action: Action, resource_pattern: impl Into<String>) -> Self {
        Self {
            action,
            resource_pattern: resource_pattern.into(),
        }
    }

    /// Create a publish permission.
    pub fn publish(resource_pattern: impl Into<String>) -> Self {
        Self::new(Action::Publish, resource_pattern)
    }

    /// Create an edit permission.
    pub fn edit(resource_pattern: impl Into<String>) -> Self {
        Self::new(Action::Edit, resource_pattern)
    }

    /// Check whether this permission grants `action` on `resource`.
    pub fn grants(&self, action: Action, resource: &str) -> bool {
        self.action == action && pattern_matches(&self.resource_pattern, resource)
    }

    /// Check if this is the global grant over every namespace.
    pub fn is_global(&self) -> bool {
        self.resource_pattern == "*"
    }
}

/// Check whether a resource pattern matches a concrete resource name.
///
/// A pattern matches when it equals the resource, when it is the global
/// `"*"`, or when it ends in `*` and the resource starts with the pattern
/// minus that trailing `*` (the separator stays part of the prefix, so
/// `io.github.alice/*` does not match `io.github.alice-fork/server`).
///
/// # Example
///
/// ```
/// use registry_permissions::pattern_matches;
///
/// assert!(pattern_matches("io.github.alice/*", "io.github.alice/server"));
/// assert!(pattern_matches("com.example.*", "com.example.api/server"));
/// assert!(pattern_matches("*", "anything/at-all"));
/// assert!(!pattern_matches("io.github.alice/*", "io.github.bob/server"));
/// ```
pub fn pattern_matches(pattern: &str, resource: &str) -> bool {
    if pattern == resource || pattern == "*" {
        return true;
    }
    match pattern.strip_suffix('*') {
        Some(prefix) => !prefix.is_empty() && resource.starts_with(prefix),
        None => false,
    }
}

/// Check whether a permission list authorizes `action` on `resource`.
///
/// First-match-wins scan in list order; an empty list authorizes nothing.
///
/// # Example
///
/// ```
/// use registry_permissions::{has_permission, Action, Permission};
///
/// let perms = vec![
///     Permission::publish("io.github.alice/*"),
///     Permission::edit("io.github.alice/server"),
/// ];
///
/// assert!(has_permission("io.github.alice/server", Action::Edit, &perms));
/// assert!(!has_permission("io.github.alice/other", Action::Edit, &perms));
/// ```
pub fn has_permission(resource: &str, action: Action, permissions: &[Permission]) -> bool {
    permissions.iter().any(|perm| perm.grants(action, resource))
}

/// Extract the namespace root of a resource pattern.
///
/// The root is the pattern with any trailing `*` and trailing separator
/// removed, truncated at the first `/`. It names the namespace the
/// deny-list is keyed on.
///
/// # Example
///
/// ```
/// use registry_permissions::namespace_root;
///
/// assert_eq!(namespace_root("io.github.alice/*"), "io.github.alice");
/// assert_eq!(namespace_root("io.github.alice/server"), "io.github.alice");
/// assert_eq!(namespace_root("com.example.*"), "com.example");
/// ```
pub fn namespace_root(pattern: &str) -> &str {
    let base = pattern
        .trim_end_matches('*')
        .trim_end_matches(['/', '.']);
    base.split('/').next().unwrap_or(base)
}
