//! # Actions
//!
//! Defines the actions a registry token can authorize. The registry write
//! surface is small: new versions are published, existing metadata is edited.

use serde::{Deserialize, Serialize};

/// Actions that can be granted over a registry namespace.
///
/// - **Publish**: Upload a new package version into a namespace
/// - **Edit**: Modify metadata of an already-published package
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Publish a new package version.
    Publish,

    /// Edit metadata of an existing package.
    Edit,
}

impl Action {
    /// Get the string representation of the action.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Publish => "publish",
            Action::Edit => "edit",
        }
    }

    /// Parse an action from its string representation.
    ///
    /// # Example
    ///
    /// ```
    /// use registry_permissions::actions::Action;
    ///
    /// assert_eq!(Action::parse("publish"), Some(Action::Publish));
    /// assert_eq!(Action::parse("Edit"), Some(Action::Edit));
    /// assert_eq!(Action::parse("delete"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "publish" => Some(Action::Publish),
            "edit" => Some(Action::Edit),
            _ => None,
        }
    }

    /// Get all actions.
    pub fn all() -> Vec<Self> {
        vec![Action::Publish, Action::Edit]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_parsing() {
        assert_eq!(Action::parse("publish"), Some(Action::Publish));
        assert_eq!(Action::parse("PUBLISH"), Some(Action::Publish));
        assert_eq!(Action::parse("edit"), Some(Action::Edit));
        assert_eq!(Action::parse("invalid"), None);
        assert_eq!(Action::parse(""), None);
    }

    #[test]
    fn test_action_as_str() {
        assert_eq!(Action::Publish.as_str(), "publish");
        assert_eq!(Action::Edit.as_str(), "edit");
    }

    #[test]
    fn test_all_actions_count() {
        assert_eq!(Action::all().len(), 2);
    }
}
