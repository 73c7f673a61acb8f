//! Capture configuration.
//!
//! [`CaptureConfig`] holds the application URL table, phase timings, browser
//! launch settings and output directory.  Defaults reproduce the stock
//! behaviour; a TOML file can override any subset of fields, and a handful
//! of `STEPSHOT_*` environment variables override the file.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use stepshot_adapters::LaunchOptions;
use stepshot_intent::Application;
use tracing::{debug, info};

use crate::error::{CaptureError, Result};

/// Config file picked up from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "stepshot.toml";

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// One row of the application URL table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppEntry {
    pub name: Application,
    pub url: String,
}

impl AppEntry {
    pub fn new(name: Application, url: impl Into<String>) -> Self {
        Self {
            name,
            url: url.into(),
        }
    }
}

/// Fixed waits and per-check timeouts, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Wait after navigation before the initial capture.
    pub settle_ms: u64,
    /// Wait after clicking the action control.
    pub after_click_ms: u64,
    /// Wait after filling the form field.
    pub after_fill_ms: u64,
    /// Wait after clicking the submit control.
    pub after_submit_ms: u64,
    /// Upper bound on a single pattern's visibility check.
    pub visibility_timeout_ms: u64,
    /// Pause between consecutive runs in a batch.
    pub batch_delay_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            settle_ms: 2000,
            after_click_ms: 2000,
            after_fill_ms: 1000,
            after_submit_ms: 2000,
            visibility_timeout_ms: 1000,
            batch_delay_ms: 3000,
        }
    }
}

impl TimingConfig {
    /// All waits set to zero.  Used by tests and dry runs.
    pub fn immediate() -> Self {
        Self {
            settle_ms: 0,
            after_click_ms: 0,
            after_fill_ms: 0,
            after_submit_ms: 0,
            visibility_timeout_ms: 0,
            batch_delay_ms: 0,
        }
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn after_click(&self) -> Duration {
        Duration::from_millis(self.after_click_ms)
    }

    pub fn after_fill(&self) -> Duration {
        Duration::from_millis(self.after_fill_ms)
    }

    pub fn after_submit(&self) -> Duration {
        Duration::from_millis(self.after_submit_ms)
    }

    pub fn visibility_timeout(&self) -> Duration {
        Duration::from_millis(self.visibility_timeout_ms)
    }

    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }
}

/// Browser launch settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub headless: bool,
    /// Delay before each navigation, click and fill.
    pub slow_mo_ms: u64,
    pub debug_port: u16,
    pub chrome_path: Option<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: false,
            slow_mo_ms: 1000,
            debug_port: 9222,
            chrome_path: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Everything the capture driver needs besides its collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Ordered application URL table.  Applications without a row use the
    /// first row.
    pub applications: Vec<AppEntry>,
    pub timing: TimingConfig,
    pub browser: BrowserConfig,
    /// Directory (relative to the artifact store root) holding one
    /// sub-directory per intent.
    pub output_dir: String,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            applications: vec![
                AppEntry::new(Application::Notion, "https://notion.so"),
                AppEntry::new(Application::Linear, "https://linear.app"),
                AppEntry::new(Application::Asana, "https://asana.com"),
            ],
            timing: TimingConfig::default(),
            browser: BrowserConfig::default(),
            output_dir: "screenshots".into(),
        }
    }
}

impl CaptureConfig {
    /// Parse a TOML document.  Missing fields keep their defaults.
    pub fn from_toml_str(source_name: &str, text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| CaptureError::Config {
            source_name: source_name.to_string(),
            reason: e.to_string(),
        })?;
        config.validate(source_name)?;
        Ok(config)
    }

    /// Load configuration from `path`, or from [`DEFAULT_CONFIG_FILE`] when
    /// it exists, or fall back to defaults.
    ///
    /// An explicit `path` that does not exist is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p,
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if !default.exists() {
                    debug!("no config file found, using defaults");
                    return Ok(Self::default());
                }
                default
            }
        };

        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&path.display().to_string(), &text)?;
        info!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Apply `STEPSHOT_*` overrides from the process environment.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    ///
    /// Recognised keys: `STEPSHOT_OUTPUT_DIR`, `STEPSHOT_CHROME_PATH`,
    /// `STEPSHOT_HEADLESS`, `STEPSHOT_DEBUG_PORT`.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(dir) = lookup("STEPSHOT_OUTPUT_DIR") {
            self.output_dir = dir;
        }
        if let Some(path) = lookup("STEPSHOT_CHROME_PATH") {
            self.browser.chrome_path = Some(path);
        }
        if let Some(raw) = lookup("STEPSHOT_HEADLESS") {
            self.browser.headless = parse_bool(&raw).ok_or_else(|| CaptureError::Config {
                source_name: "STEPSHOT_HEADLESS".into(),
                reason: format!("expected a boolean, got `{raw}`"),
            })?;
        }
        if let Some(raw) = lookup("STEPSHOT_DEBUG_PORT") {
            self.browser.debug_port = raw.parse().map_err(|e| CaptureError::Config {
                source_name: "STEPSHOT_DEBUG_PORT".into(),
                reason: format!("invalid port `{raw}`: {e}"),
            })?;
        }
        Ok(self)
    }

    fn validate(&self, source_name: &str) -> Result<()> {
        if self.applications.is_empty() {
            return Err(CaptureError::Config {
                source_name: source_name.to_string(),
                reason: "`applications` must list at least one entry".into(),
            });
        }
        Ok(())
    }

    /// Entry URL for `application`; unmapped applications get the first row.
    pub fn url_for(&self, application: Application) -> Option<&str> {
        self.applications
            .iter()
            .find(|entry| entry.name == application)
            .or_else(|| self.applications.first())
            .map(|entry| entry.url.as_str())
    }

    pub fn launch_options(&self) -> LaunchOptions {
        LaunchOptions {
            headless: self.browser.headless,
            slow_mo: Duration::from_millis(self.browser.slow_mo_ms),
            debug_port: self.browser.debug_port,
            chrome_path: self.browser.chrome_path.clone(),
        }
    }

    pub fn with_timing(mut self, timing: TimingConfig) -> Self {
        self.timing = timing;
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.browser.headless = headless;
        self
    }

    pub fn with_applications(mut self, applications: Vec<AppEntry>) -> Self {
        self.applications = applications;
        self
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
