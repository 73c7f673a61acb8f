//! Adaptive capture workflow driver for stepshot.
//!
//! This crate provides:
//!
//! - **Driver**: runs the navigate / action-control / form / finalize phase
//!   sequence for one question via [`driver::Driver`], or a serialized batch
//!   of questions via [`driver::Driver::run_batch`].
//! - **Probes**: ordered, early-exit pattern matching over an unknown page
//!   ([`probe::activate_first`]).
//! - **Capture context**: the step-numbered screenshot protocol
//!   ([`context::RunContext`]).
//! - **Configuration**: application URL table, timings and browser settings
//!   ([`config::CaptureConfig`]).

pub mod config;
pub mod context;
pub mod driver;
pub mod error;
pub mod patterns;
pub mod probe;
pub mod record;

pub use config::{AppEntry, BrowserConfig, CaptureConfig, TimingConfig};
pub use context::{CaptureLabel, RunContext};
pub use driver::{
    BatchEntry, BatchSummary, DEFAULT_QUESTION, Driver, PhaseOutcome, SAMPLE_QUESTIONS,
};
pub use error::{CaptureError, Result};
pub use probe::ProbeOutcome;
pub use record::{PhaseSummary, RunOutcome, RunRecord};
