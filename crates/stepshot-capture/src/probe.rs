//! Ordered capability probes.
//!
//! A probe walks a pattern list left to right and short-circuits on the
//! first pattern that yields a visible element.  Lookups that find nothing,
//! time out, or fail are misses, not errors: they are logged at debug level
//! and the next pattern is tried.

use std::time::Duration;

use stepshot_adapters::{AdapterError, ElementHandle, Page, Pattern};
use tracing::debug;

/// Extra time a single lookup may take on top of its visibility timeout.
const LOOKUP_GRACE: Duration = Duration::from_secs(5);

/// Result of walking a pattern list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The pattern at `index` matched a visible element, which was clicked.
    Activated { index: usize, pattern: Pattern },
    /// No pattern produced a visible, clickable element.
    NotFound,
}

/// Click the first visible element matched by `patterns`.
///
/// Patterns after the first successful click are never looked up.  A click
/// that fails is treated like a miss.
pub async fn activate_first(
    page: &dyn Page,
    patterns: &[Pattern],
    timeout: Duration,
) -> ProbeOutcome {
    for (index, pattern) in patterns.iter().enumerate() {
        let Some(element) = find_visible(page, pattern, timeout).await else {
            continue;
        };

        match element.click().await {
            Ok(()) => {
                return ProbeOutcome::Activated {
                    index,
                    pattern: pattern.clone(),
                };
            }
            Err(e) => debug!(pattern = %pattern, error = %e, "click failed, trying next pattern"),
        }
    }

    ProbeOutcome::NotFound
}

/// Whether any of `patterns` matches a visible element.
pub async fn any_visible(page: &dyn Page, patterns: &[Pattern], timeout: Duration) -> bool {
    for pattern in patterns {
        if find_visible(page, pattern, timeout).await.is_some() {
            return true;
        }
    }
    false
}

/// Locate the first match for `pattern` and return it if it becomes visible
/// within `timeout`.
async fn find_visible(
    page: &dyn Page,
    pattern: &Pattern,
    timeout: Duration,
) -> Option<Box<dyn ElementHandle>> {
    let lookup = async {
        let Some(element) = page.locate_first(pattern).await? else {
            return Ok::<_, AdapterError>(None);
        };
        let visible = element.is_visible(timeout).await?;
        Ok(visible.then_some(element))
    };

    match tokio::time::timeout(timeout + LOOKUP_GRACE, lookup).await {
        Ok(Ok(Some(el))) => Some(el),
        Ok(Ok(None)) => {
            debug!(pattern = %pattern, "no visible match");
            None
        }
        Ok(Err(e)) => {
            debug!(pattern = %pattern, error = %e, "lookup failed");
            None
        }
        Err(_) => {
            debug!(pattern = %pattern, "lookup timed out");
            None
        }
    }
}
