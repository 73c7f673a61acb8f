//! Question-to-intent parsing for stepshot.
//!
//! This crate turns a how-to question ("How do I create a new page in
//! Notion?") into a structured [`Intent`] via the rule-based [`parse`]
//! function.  It performs no I/O.

pub mod intent;
pub mod parser;

pub use intent::{Action, Application, Intent, Target};
pub use parser::parse;
