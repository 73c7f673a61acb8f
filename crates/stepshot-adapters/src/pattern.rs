//! Element-matching patterns.
//!
//! A [`Pattern`] describes how to find an element on an unknown page.  The
//! browser adapter translates each variant into a DOM query; the capture
//! driver only builds and orders them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A typed element matcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Pattern {
    /// The innermost elements whose visible text matches a case-insensitive
    /// regular expression (JavaScript regex syntax).
    TextMatches { regex: String },

    /// Elements with the given tag name whose text contains `text`,
    /// compared case-insensitively.
    HasText { tag: String, text: String },

    /// A raw CSS selector.
    Css { selector: String },
}

impl Pattern {
    pub fn text_matches(regex: impl Into<String>) -> Self {
        Self::TextMatches {
            regex: regex.into(),
        }
    }

    pub fn has_text(tag: impl Into<String>, text: impl Into<String>) -> Self {
        Self::HasText {
            tag: tag.into(),
            text: text.into(),
        }
    }

    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css {
            selector: selector.into(),
        }
    }
}

/// Renders the Playwright-style selector form, used in log output.
impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TextMatches { regex } => write!(f, "text=/{regex}/i"),
            Self::HasText { tag, text } => write!(f, "{tag}:has-text(\"{text}\")"),
            Self::Css { selector } => f.write_str(selector),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_text_matches() {
        let p = Pattern::text_matches(".*create.*page");
        assert_eq!(p.to_string(), "text=/.*create.*page/i");
    }

    #[test]
    fn display_has_text() {
        let p = Pattern::has_text("button", "New");
        assert_eq!(p.to_string(), "button:has-text(\"New\")");
    }

    #[test]
    fn display_css_is_verbatim() {
        let p = Pattern::css("[aria-label*=\"create\"]");
        assert_eq!(p.to_string(), "[aria-label*=\"create\"]");
    }
}
