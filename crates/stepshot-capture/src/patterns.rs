//! Element pattern tables.
//!
//! Each list is ordered most-specific first.  The probe walks a list in
//! order and stops at the first visible match, so reordering changes which
//! control gets clicked.

use stepshot_adapters::Pattern;
use stepshot_intent::Intent;

/// Candidate controls that start the requested action.
pub fn action_control_patterns(intent: &Intent) -> Vec<Pattern> {
    let action = intent.action.as_str();
    let target = intent.target.as_str();

    vec![
        // Semantic: text naming both the action and the target.
        Pattern::text_matches(format!(".*{action}.*{target}")),
        Pattern::text_matches(format!(".*new.*{target}")),
        Pattern::text_matches(format!(".*add.*{target}")),
        Pattern::has_text("button", action),
        Pattern::has_text("button", "New"),
        Pattern::has_text("button", "Add"),
        Pattern::has_text("button", "Create"),
        // Attribute-based.
        Pattern::css(r#"[aria-label*="create"]"#),
        Pattern::css(r#"[aria-label*="new"]"#),
        // Structural: icon-only buttons and creation-ish class names.
        Pattern::css("button:has(svg)"),
        Pattern::css(".plus-button"),
        Pattern::css(r#"[class*="create"]"#),
        Pattern::css(r#"[class*="add-new"]"#),
    ]
}

/// Candidate controls that submit a detected form.
pub fn submit_patterns() -> Vec<Pattern> {
    let mut patterns = vec![Pattern::css(r#"button[type="submit"]"#)];
    patterns.extend(
        ["Create", "Save", "Add", "Done", "Submit"]
            .into_iter()
            .map(|label| Pattern::has_text("button", label)),
    );
    patterns
}

/// Signs that a dialog or form is on screen.
pub fn form_presence_patterns() -> Vec<Pattern> {
    vec![
        Pattern::css(r#"[role="dialog"], .modal, [class*="modal"]"#),
        Pattern::css("form"),
    ]
}

/// Input elements that may accept free text.
pub fn text_input_pattern() -> Pattern {
    Pattern::css(r#"input[type="text"], input[type="email"], input:not([type])"#)
}

/// Whether an input with the given `type` attribute accepts free text.
///
/// Absent, empty, `text` and `email` qualify; checkboxes, radios, dates and
/// everything else do not.
pub fn is_fillable_type(input_type: Option<&str>) -> bool {
    match input_type {
        None => true,
        Some(t) => matches!(t.trim().to_ascii_lowercase().as_str(), "" | "text" | "email"),
    }
}

/// Synthetic value typed into the first fillable field.
pub fn filler_text(intent: &Intent) -> String {
    format!("Test {}", intent.target)
}
