//! Intent parser: classifies a how-to question into an [`Intent`].
//!
//! Classification is a case-insensitive substring search.  Each field is
//! resolved independently by walking a fixed rule table and taking the first
//! rule with a matching keyword.  The table order is the tie-break when a
//! question mentions several candidates ("add a task to a project" resolves
//! to `project`), so it must stay as written.

use tracing::debug;

use crate::intent::{Action, Application, Intent, Target};

// ---------------------------------------------------------------------------
// Rule tables
// ---------------------------------------------------------------------------

/// Action keywords, in priority order.
const ACTION_RULES: &[(&[&str], Action)] = &[
    (&["create", "add"], Action::Create),
    (&["filter"], Action::Filter),
    (&["delete"], Action::Delete),
    (&["edit", "change"], Action::Edit),
];

/// Application keywords, in priority order.
const APPLICATION_RULES: &[(&[&str], Application)] = &[
    (&["notion"], Application::Notion),
    (&["linear"], Application::Linear),
    (&["asana"], Application::Asana),
];

/// Target keywords, in priority order.
const TARGET_RULES: &[(&[&str], Target)] = &[
    (&["page"], Target::Page),
    (&["project"], Target::Project),
    (&["task"], Target::Task),
    (&["issue"], Target::Issue),
    (&["database"], Target::Database),
];

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Parse a free-text question into a structured intent.
///
/// Total and pure: every input yields a fully populated [`Intent`], with
/// unrecognised fields set to `Unknown`.
pub fn parse(question: &str) -> Intent {
    let lower = question.to_lowercase();

    let intent = Intent {
        action: classify(&lower, ACTION_RULES, Action::Unknown),
        application: classify(&lower, APPLICATION_RULES, Application::Unknown),
        target: classify(&lower, TARGET_RULES, Target::Unknown),
        original_text: question.to_string(),
    };

    debug!(
        action = %intent.action,
        application = %intent.application,
        target = %intent.target,
        "parsed question"
    );

    intent
}

/// Return the value of the first rule whose keywords occur in `text`.
fn classify<T: Copy>(text: &str, rules: &[(&[&str], T)], fallback: T) -> T {
    rules
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| text.contains(k)))
        .map(|(_, value)| *value)
        .unwrap_or(fallback)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_create_page_in_notion() {
        let intent = parse("How do I create a new page in Notion?");
        assert_eq!(intent.action, Action::Create);
        assert_eq!(intent.application, Application::Notion);
        assert_eq!(intent.target, Target::Page);
        assert_eq!(intent.original_text, "How do I create a new page in Notion?");
        assert_eq!(intent.folder_name(), "notion-create-page");
    }

    #[test]
    fn add_maps_to_create() {
        let intent = parse("How do I add a project in Linear?");
        assert_eq!(intent.action, Action::Create);
        assert_eq!(intent.application, Application::Linear);
        assert_eq!(intent.target, Target::Project);
    }

    #[test]
    fn filter_tasks_in_asana() {
        let intent = parse("How do I filter tasks in Asana?");
        assert_eq!(intent.action, Action::Filter);
        assert_eq!(intent.application, Application::Asana);
        assert_eq!(intent.target, Target::Task);
    }

    #[test]
    fn delete_and_edit_keywords() {
        assert_eq!(parse("delete this issue").action, Action::Delete);
        assert_eq!(parse("edit a database").action, Action::Edit);
        assert_eq!(parse("change the title").action, Action::Edit);
    }

    #[test]
    fn create_wins_over_later_actions() {
        // "create" is checked before "delete".
        assert_eq!(parse("create or delete a page").action, Action::Create);
        assert_eq!(parse("filter then edit").action, Action::Filter);
    }

    #[test]
    fn project_wins_over_task() {
        assert_eq!(parse("add a task to a project").target, Target::Project);
        assert_eq!(parse("move project tasks").target, Target::Project);
    }

    #[test]
    fn page_wins_over_everything() {
        let intent = parse("issue, database, task, project or page?");
        assert_eq!(intent.target, Target::Page);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let intent = parse("CREATE A DATABASE IN NOTION");
        assert_eq!(intent.action, Action::Create);
        assert_eq!(intent.application, Application::Notion);
        assert_eq!(intent.target, Target::Database);
    }

    #[test]
    fn unrecognised_fields_are_unknown() {
        let intent = parse("What is the weather like?");
        assert_eq!(intent.action, Action::Unknown);
        assert_eq!(intent.application, Application::Unknown);
        assert_eq!(intent.target, Target::Unknown);
        assert_eq!(intent.folder_name(), "unknown-unknown-unknown");
    }

    #[test]
    fn empty_input_is_all_unknown() {
        let intent = parse("");
        assert_eq!(intent.action, Action::Unknown);
        assert_eq!(intent.application, Application::Unknown);
        assert_eq!(intent.target, Target::Unknown);
        assert!(intent.original_text.is_empty());
    }

    #[test]
    fn substring_matching_includes_embedded_words() {
        // "address" contains "add".
        assert_eq!(parse("update my address").action, Action::Create);
    }

    #[test]
    fn parse_is_deterministic() {
        let q = "How do I create an issue in Linear?";
        assert_eq!(parse(q), parse(q));
    }
}
