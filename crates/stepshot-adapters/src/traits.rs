//! Collaborator traits consumed by the capture driver.
//!
//! The driver never talks to a browser or the filesystem directly.  It goes
//! through these traits, which lets the production implementations
//! ([`crate::CdpLauncher`], [`crate::FsArtifactStore`]) be swapped for
//! scripted fakes in tests.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;
use crate::pattern::Pattern;

// ---------------------------------------------------------------------------
// Supporting types
// ---------------------------------------------------------------------------

/// Options controlling how a browser session is started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOptions {
    /// Run the browser without a visible window.
    pub headless: bool,
    /// Delay inserted before every navigation, click and fill so a human
    /// watching the window can follow along.
    pub slow_mo: Duration,
    /// Chrome remote debugging port.
    pub debug_port: u16,
    /// Explicit Chrome/Chromium executable; searched on the system if unset.
    pub chrome_path: Option<String>,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            headless: false,
            slow_mo: Duration::from_millis(1000),
            debug_port: 9222,
            chrome_path: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Browser traits
// ---------------------------------------------------------------------------

/// Starts browser sessions.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    /// Acquire a new browser session.
    async fn launch(&self, options: &LaunchOptions) -> Result<Box<dyn BrowserSession>>;
}

/// A live browser.  Must be closed explicitly by its owner.
#[async_trait]
pub trait BrowserSession: Send {
    /// Open a new blank page.
    async fn new_page(&mut self) -> Result<Box<dyn Page>>;

    /// Release every resource held by the session.
    async fn close(&mut self) -> Result<()>;
}

/// A single browser tab.
#[async_trait]
pub trait Page: Send + Sync {
    /// Navigate to `url`.
    async fn goto(&self, url: &str) -> Result<()>;

    /// Wait a fixed amount of time for the page to settle.
    async fn wait_for(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    /// Capture the visible viewport as PNG bytes.
    async fn screenshot(&self) -> Result<Vec<u8>>;

    /// Return the first element matching `pattern`, if any.
    async fn locate_first(&self, pattern: &Pattern) -> Result<Option<Box<dyn ElementHandle>>>;

    /// Return every element matching `pattern`, in document order.
    async fn locate_all(&self, pattern: &Pattern) -> Result<Vec<Box<dyn ElementHandle>>>;
}

/// A reference to one element on a [`Page`].
#[async_trait]
pub trait ElementHandle: Send + Sync {
    /// Whether the element becomes visible within `timeout`.
    async fn is_visible(&self, timeout: Duration) -> Result<bool>;

    /// Activate the element.
    async fn click(&self) -> Result<()>;

    /// Replace the element's value with `text`.
    async fn fill(&self, text: &str) -> Result<()>;

    /// Read an attribute; `None` when absent.
    async fn get_attribute(&self, name: &str) -> Result<Option<String>>;
}

// ---------------------------------------------------------------------------
// Artifact store
// ---------------------------------------------------------------------------

/// Persists captures and run records.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Create `path` and any missing parents.
    async fn ensure_directory(&self, path: &Path) -> Result<()>;

    /// Write image bytes to `path`, replacing any existing file.
    async fn write_image(&self, path: &Path, bytes: &[u8]) -> Result<()>;

    /// Write a structured record to `path` as pretty-printed JSON.
    async fn write_record(&self, path: &Path, record: &serde_json::Value) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn launch_options_defaults() {
        let opts = LaunchOptions::default();
        assert!(!opts.headless);
        assert_eq!(opts.slow_mo, Duration::from_millis(1000));
        assert_eq!(opts.debug_port, 9222);
        assert!(opts.chrome_path.is_none());
    }
}
