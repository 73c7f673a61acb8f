//! Per-run capture context.
//!
//! [`RunContext`] owns the step counter for one run.  The counter only
//! advances inside [`RunContext::capture`], after the image has been
//! written, so the number of steps always equals the number of files on disk.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use stepshot_adapters::{ArtifactStore, Page};
use tracing::info;

use crate::error::Result;

/// The phase transition a capture documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CaptureLabel {
    Initial,
    AfterActionClick,
    FormModal,
    FormFilled,
    AfterSubmit,
    Final,
}

impl CaptureLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::AfterActionClick => "after-action-click",
            Self::FormModal => "form-modal",
            Self::FormFilled => "form-filled",
            Self::AfterSubmit => "after-submit",
            Self::Final => "final",
        }
    }
}

impl fmt::Display for CaptureLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// File name for capture number `step` with `label`.
pub fn capture_file_name(step: u32, label: CaptureLabel) -> String {
    format!("step-{step}-{label}.png")
}

/// Mutable state of one in-flight run.
pub struct RunContext<'a> {
    store: &'a dyn ArtifactStore,
    output_dir: PathBuf,
    /// File names of captures written so far, in order.
    captures: Vec<String>,
}

impl<'a> RunContext<'a> {
    pub fn new(store: &'a dyn ArtifactStore, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            output_dir: output_dir.into(),
            captures: Vec::new(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Number of captures written so far.
    pub fn step_count(&self) -> u32 {
        self.captures.len() as u32
    }

    pub fn captures(&self) -> &[String] {
        &self.captures
    }

    /// Screenshot `page`, write it as the next numbered step, and advance
    /// the counter.
    ///
    /// If either the screenshot or the write fails, the counter is left
    /// unchanged and the error is returned.
    pub async fn capture(&mut self, page: &dyn Page, label: CaptureLabel) -> Result<u32> {
        let step = self.step_count() + 1;
        let bytes = page.screenshot().await?;

        let file_name = capture_file_name(step, label);
        self.store
            .write_image(&self.output_dir.join(&file_name), &bytes)
            .await?;
        self.captures.push(file_name);

        info!(step = step, label = %label, "captured");
        Ok(step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_kebab_case() {
        assert_eq!(CaptureLabel::Initial.as_str(), "initial");
        assert_eq!(CaptureLabel::AfterActionClick.as_str(), "after-action-click");
        assert_eq!(CaptureLabel::FormModal.as_str(), "form-modal");
        assert_eq!(CaptureLabel::FormFilled.as_str(), "form-filled");
        assert_eq!(CaptureLabel::AfterSubmit.as_str(), "after-submit");
        assert_eq!(CaptureLabel::Final.as_str(), "final");
    }

    #[test]
    fn label_serde_matches_as_str() {
        let json = serde_json::to_string(&CaptureLabel::AfterSubmit).unwrap();
        assert_eq!(json, "\"after-submit\"");
    }

    #[test]
    fn file_names_are_numbered() {
        assert_eq!(capture_file_name(1, CaptureLabel::Initial), "step-1-initial.png");
        assert_eq!(
            capture_file_name(3, CaptureLabel::AfterActionClick),
            "step-3-after-action-click.png"
        );
    }
}
