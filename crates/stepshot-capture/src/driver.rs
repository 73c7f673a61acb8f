//! Workflow driver: turns a question into a captured walkthrough.
//!
//! One run goes through a fixed phase sequence:
//!
//! 1. **Navigate** to the application's entry URL, wait, capture `initial`.
//! 2. **Action control**: probe the action patterns; on a hit, click, wait,
//!    capture `after-action-click`.
//! 3. **Form**: if a dialog or form is visible, capture `form-modal`, fill the
//!    first free-text input, capture `form-filled`, then probe the submit
//!    patterns and capture `after-submit` on a hit.
//! 4. **Finalize**: capture `final` and persist the run record.
//!
//! Phases 2 and 3 return [`PhaseOutcome::NotFound`] when their controls are
//! missing and the run simply moves on.  Any adapter error aborts the
//! remaining phases; the browser session is closed on every path.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use stepshot_adapters::{ArtifactStore, BrowserLauncher, BrowserSession, Page};
use stepshot_intent::{Intent, parse};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::CaptureConfig;
use crate::context::{CaptureLabel, RunContext};
use crate::error::{CaptureError, Result};
use crate::patterns::{
    action_control_patterns, filler_text, form_presence_patterns, is_fillable_type,
    submit_patterns, text_input_pattern,
};
use crate::probe::{ProbeOutcome, activate_first, any_visible};
use crate::record::{PhaseSummary, RECORD_FILE_NAME, RunOutcome, RunRecord};

/// Question used when none is supplied.
pub const DEFAULT_QUESTION: &str = "How do I create a new page in Notion?";

/// Built-in batch of sample questions.
pub const SAMPLE_QUESTIONS: [&str; 5] = [
    "How do I create a new page in Notion?",
    "How do I add a project in Linear?",
    "How do I filter tasks in Asana?",
    "How do I create a database in Notion?",
    "How do I create an issue in Linear?",
];

/// Whether an optional phase found and used its control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseOutcome {
    Acted,
    NotFound,
}

// ---------------------------------------------------------------------------
// Batch results
// ---------------------------------------------------------------------------

/// The result of one question in a batch.
#[derive(Debug)]
pub struct BatchEntry {
    pub question: String,
    pub result: Result<RunOutcome>,
}

/// Per-question results of [`Driver::run_batch`], in input order.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub entries: Vec<BatchEntry>,
}

impl BatchSummary {
    /// Runs that persisted a record.
    pub fn completed(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.result, Ok(RunOutcome::Completed(_))))
            .count()
    }

    /// Runs that were aborted or never started.
    pub fn failed(&self) -> usize {
        self.entries.len() - self.completed()
    }
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

/// Runs capture workflows against an injected browser and artifact store.
pub struct Driver {
    config: CaptureConfig,
    launcher: Arc<dyn BrowserLauncher>,
    store: Arc<dyn ArtifactStore>,
}

impl Driver {
    pub fn new(
        config: CaptureConfig,
        launcher: Arc<dyn BrowserLauncher>,
        store: Arc<dyn ArtifactStore>,
    ) -> Self {
        Self {
            config,
            launcher,
            store,
        }
    }

    /// Parse `question` and capture the workflow it describes.
    ///
    /// Returns `Err` only when the output directory cannot be created or no
    /// browser session can be acquired.  Failures after that are reported
    /// as [`RunOutcome::Aborted`].
    pub async fn run(&self, question: &str) -> Result<RunOutcome> {
        let intent = parse(question);
        info!(
            question = question,
            action = %intent.action,
            application = %intent.application,
            target = %intent.target,
            "parsed task"
        );
        self.run_intent(intent).await
    }

    /// Capture the workflow for an already parsed intent.
    pub async fn run_intent(&self, intent: Intent) -> Result<RunOutcome> {
        let output_dir = Path::new(&self.config.output_dir).join(intent.folder_name());
        let output_location = output_dir.display().to_string();
        self.store.ensure_directory(&output_dir).await?;

        let mut session = self.launcher.launch(&self.config.launch_options()).await?;
        let mut ctx = RunContext::new(self.store.as_ref(), output_dir);

        let result = self.drive(session.as_mut(), &intent, &mut ctx).await;

        if let Err(e) = session.close().await {
            warn!(error = %e, "failed to close browser session");
        }

        match result {
            Ok(record) => {
                info!(
                    steps = record.step_count,
                    output = %record.output_location,
                    "capture complete"
                );
                Ok(RunOutcome::Completed(record))
            }
            Err(e) => {
                error!(
                    error = %e,
                    steps = ctx.step_count(),
                    output = %output_location,
                    "error during capture"
                );
                Ok(RunOutcome::Aborted {
                    steps_captured: ctx.step_count(),
                    output_location,
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Run every question in order, pausing between runs.
    ///
    /// A failing run is logged and the batch moves on to the next question.
    pub async fn run_batch<S: AsRef<str>>(&self, questions: &[S]) -> BatchSummary {
        let mut summary = BatchSummary::default();

        for (index, question) in questions.iter().enumerate() {
            let question = question.as_ref();
            if index > 0 {
                debug!(
                    delay_ms = self.config.timing.batch_delay_ms,
                    "waiting before next run"
                );
                tokio::time::sleep(self.config.timing.batch_delay()).await;
            }

            info!(
                run = index + 1,
                total = questions.len(),
                question = question,
                "starting run"
            );

            let result = self.run(question).await;
            if let Err(e) = &result {
                error!(question = question, error = %e, "run failed");
            }
            summary.entries.push(BatchEntry {
                question: question.to_string(),
                result,
            });
        }

        info!(
            completed = summary.completed(),
            failed = summary.failed(),
            "batch complete"
        );
        summary
    }

    // -----------------------------------------------------------------------
    // Phases
    // -----------------------------------------------------------------------

    async fn drive(
        &self,
        session: &mut dyn BrowserSession,
        intent: &Intent,
        ctx: &mut RunContext<'_>,
    ) -> Result<RunRecord> {
        let page = session.new_page().await?;
        let page = page.as_ref();
        let mut phases = PhaseSummary::default();

        self.navigate(page, intent, ctx).await?;
        let action = self.trigger_action_control(page, intent, ctx, &mut phases).await?;
        let form = self.complete_form(page, intent, ctx, &mut phases).await?;
        info!(
            action_control = ?action,
            form = ?form,
            steps = ctx.step_count(),
            "interaction phases finished"
        );

        ctx.capture(page, CaptureLabel::Final).await?;

        let record = RunRecord {
            run_id: Uuid::now_v7(),
            question: intent.original_text.clone(),
            intent: intent.clone(),
            step_count: ctx.step_count(),
            captures: ctx.captures().to_vec(),
            phases,
            timestamp: Utc::now(),
            output_location: ctx.output_dir().display().to_string(),
        };

        let record_path = ctx.output_dir().join(RECORD_FILE_NAME);
        self.store
            .write_record(&record_path, &serde_json::to_value(&record)?)
            .await?;
        info!(path = %record_path.display(), "saved run record");

        Ok(record)
    }

    async fn navigate(
        &self,
        page: &dyn Page,
        intent: &Intent,
        ctx: &mut RunContext<'_>,
    ) -> Result<()> {
        let url = self
            .config
            .url_for(intent.application)
            .ok_or_else(|| CaptureError::NoEntryUrl {
                application: intent.application.to_string(),
            })?;

        info!(application = %intent.application, url = url, "opening application");
        page.goto(url).await?;
        page.wait_for(self.config.timing.settle()).await;

        ctx.capture(page, CaptureLabel::Initial).await?;
        Ok(())
    }

    async fn trigger_action_control(
        &self,
        page: &dyn Page,
        intent: &Intent,
        ctx: &mut RunContext<'_>,
        phases: &mut PhaseSummary,
    ) -> Result<PhaseOutcome> {
        let patterns = action_control_patterns(intent);
        let timeout = self.config.timing.visibility_timeout();

        match activate_first(page, &patterns, timeout).await {
            ProbeOutcome::Activated { index, pattern } => {
                info!(pattern = %pattern, index = index, "clicked action control");
                page.wait_for(self.config.timing.after_click()).await;
                ctx.capture(page, CaptureLabel::AfterActionClick).await?;
                phases.action_control = Some(pattern.to_string());
                Ok(PhaseOutcome::Acted)
            }
            ProbeOutcome::NotFound => {
                info!("no action control found, capturing visible UI");
                Ok(PhaseOutcome::NotFound)
            }
        }
    }

    async fn complete_form(
        &self,
        page: &dyn Page,
        intent: &Intent,
        ctx: &mut RunContext<'_>,
        phases: &mut PhaseSummary,
    ) -> Result<PhaseOutcome> {
        if !any_visible(page, &form_presence_patterns(), Duration::ZERO).await {
            info!("no form or dialog detected");
            return Ok(PhaseOutcome::NotFound);
        }

        info!("found form or dialog");
        phases.form_detected = true;
        ctx.capture(page, CaptureLabel::FormModal).await?;

        if self.fill_first_text_input(page, intent).await? {
            phases.form_filled = true;
            page.wait_for(self.config.timing.after_fill()).await;
            ctx.capture(page, CaptureLabel::FormFilled).await?;
        }

        let timeout = self.config.timing.visibility_timeout();
        match activate_first(page, &submit_patterns(), timeout).await {
            ProbeOutcome::Activated { pattern, .. } => {
                info!(pattern = %pattern, "clicked submit control");
                page.wait_for(self.config.timing.after_submit()).await;
                ctx.capture(page, CaptureLabel::AfterSubmit).await?;
                phases.submit_control = Some(pattern.to_string());
            }
            ProbeOutcome::NotFound => info!("no submit control found"),
        }

        Ok(PhaseOutcome::Acted)
    }

    /// Fill only the first input that accepts free text.
    ///
    /// Returns whether a field was filled.
    async fn fill_first_text_input(&self, page: &dyn Page, intent: &Intent) -> Result<bool> {
        let inputs = match page.locate_all(&text_input_pattern()).await {
            Ok(inputs) => inputs,
            Err(e) => {
                debug!(error = %e, "input lookup failed");
                return Ok(false);
            }
        };

        let mut fillable = Vec::new();
        for input in inputs {
            match input.get_attribute("type").await {
                Ok(input_type) if is_fillable_type(input_type.as_deref()) => fillable.push(input),
                Ok(_) => {}
                Err(e) => debug!(error = %e, "could not read input type"),
            }
        }

        let Some(first) = fillable.first() else {
            info!("no text input fields found");
            return Ok(false);
        };

        info!(count = fillable.len(), "found text input fields");
        first.fill(&filler_text(intent)).await?;
        Ok(true)
    }
}
