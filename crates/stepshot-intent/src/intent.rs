//! Structured intent types.
//!
//! An [`Intent`] is the `(action, application, target)` triple extracted from
//! a free-text question.  Every field is always populated; concepts the
//! parser does not recognise map to the `Unknown` variant of each enum.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Field enums
// ---------------------------------------------------------------------------

/// The operation the user wants to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Create,
    Filter,
    Delete,
    Edit,
    Unknown,
}

impl Action {
    /// The lowercase keyword form, as used in folder names and element patterns.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Filter => "filter",
            Self::Delete => "delete",
            Self::Edit => "edit",
            Self::Unknown => "unknown",
        }
    }
}

/// The web application the question is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Application {
    Notion,
    Linear,
    Asana,
    Unknown,
}

impl Application {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Notion => "notion",
            Self::Linear => "linear",
            Self::Asana => "asana",
            Self::Unknown => "unknown",
        }
    }
}

/// The kind of object the action applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    Page,
    Project,
    Task,
    Issue,
    Database,
    Unknown,
}

impl Target {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::Project => "project",
            Self::Task => "task",
            Self::Issue => "issue",
            Self::Database => "database",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Intent
// ---------------------------------------------------------------------------

/// A structured representation of a how-to question.
///
/// Constructed once per request by [`crate::parse`] and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    /// The requested operation.
    pub action: Action,
    /// The application the operation should be performed in.
    pub application: Application,
    /// The object the operation applies to.
    pub target: Target,
    /// The verbatim input question.
    pub original_text: String,
}

impl Intent {
    /// Name of the directory a run for this intent writes its captures to.
    ///
    /// Formed as `application-action-target` with any spaces replaced by
    /// hyphens, e.g. `notion-create-page`.
    pub fn folder_name(&self) -> String {
        format!("{}-{}-{}", self.application, self.action, self.target).replace(' ', "-")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intent(action: Action, application: Application, target: Target) -> Intent {
        Intent {
            action,
            application,
            target,
            original_text: String::new(),
        }
    }

    #[test]
    fn folder_name_joins_fields() {
        let i = intent(Action::Create, Application::Notion, Target::Page);
        assert_eq!(i.folder_name(), "notion-create-page");
    }

    #[test]
    fn folder_name_with_unknowns() {
        let i = intent(Action::Unknown, Application::Unknown, Target::Unknown);
        assert_eq!(i.folder_name(), "unknown-unknown-unknown");
    }

    #[test]
    fn display_matches_as_str() {
        assert_eq!(Action::Filter.to_string(), "filter");
        assert_eq!(Application::Asana.to_string(), "asana");
        assert_eq!(Target::Database.to_string(), "database");
    }

    #[test]
    fn serializes_as_snake_case() {
        let i = Intent {
            action: Action::Edit,
            application: Application::Linear,
            target: Target::Issue,
            original_text: "How do I change an issue in Linear?".into(),
        };
        let json = serde_json::to_value(&i).unwrap();
        assert_eq!(json["action"], "edit");
        assert_eq!(json["application"], "linear");
        assert_eq!(json["target"], "issue");
        assert_eq!(json["original_text"], "How do I change an issue in Linear?");
    }
}
