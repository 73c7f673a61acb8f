//! CLI argument definitions for stepshot.
//!
//! All `clap` structures live here so that `main.rs` stays focused on
//! dispatching subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// stepshot -- capture step-by-step screenshots of a web app workflow.
#[derive(Parser, Debug)]
#[command(
    name = "stepshot",
    version,
    about = "stepshot -- capture step-by-step screenshots of a web app workflow",
    long_about = "Turns a how-to question such as \"How do I add a project in Linear?\" into \
                  a browser session that opens the application, tries likely controls, and \
                  saves a numbered screenshot of every step.",
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    /// Path to a TOML config file (defaults to ./stepshot.toml when present).
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level, including every pattern miss.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Run the browser without a window.
    #[arg(long, global = true)]
    pub headless: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// The question to capture.  Words are joined with spaces.
    pub question: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Capture every built-in sample question in turn.
    All,

    /// Print the parsed intent for a question without opening a browser.
    Parse {
        #[arg(required = true)]
        question: Vec<String>,
    },
}

impl Cli {
    /// The positional question, or `None` when no words were given.
    pub fn question_text(&self) -> Option<String> {
        (!self.question.is_empty()).then(|| self.question.join(" "))
    }
}
