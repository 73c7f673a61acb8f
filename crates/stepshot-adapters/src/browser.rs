//! Browser adapter -- drive a Chromium-based browser via the Chrome DevTools Protocol.
//!
//! This adapter talks to Chrome/Chromium over its remote debugging port.  It
//! implements the [`BrowserLauncher`], [`BrowserSession`], [`Page`] and
//! [`ElementHandle`] traits on top of plain CDP commands.
//!
//! # Architecture
//!
//! 1. [`CdpLauncher::launch`] checks `http://localhost:{port}/json/version`
//!    and reuses a reachable browser, or spawns Chrome with
//!    `--remote-debugging-port` and polls until the endpoint answers.
//! 2. [`BrowserSession::new_page`] opens a fresh target via `PUT /json/new`
//!    and remembers its WebSocket debugger URL.
//! 3. Every CDP command opens a WebSocket to that target, sends one message,
//!    waits for the response with the matching id, and closes the connection.
//! 4. Elements are located with `Runtime.evaluate`.  Each match is tagged with
//!    a `data-stepshot-handle` attribute so later calls (visibility, click,
//!    fill) can find the same node again.

use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::process::{Child, Command};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use crate::error::{AdapterError, Result};
use crate::pattern::Pattern;
use crate::traits::{BrowserLauncher, BrowserSession, ElementHandle, LaunchOptions, Page};

/// Timeout for CDP WebSocket operations in seconds.
const CDP_TIMEOUT_SECS: u64 = 30;

/// Timeout for HTTP requests to the DevTools endpoint in seconds.
const HTTP_TIMEOUT_SECS: u64 = 10;

/// Timeout waiting for Chrome to start up in seconds.
const CHROME_STARTUP_TIMEOUT_SECS: u64 = 10;

/// Maximum response body size from CDP in bytes (32 MB, full-page PNGs are large).
const MAX_CDP_RESPONSE_BYTES: usize = 32 * 1024 * 1024;

/// Interval between visibility checks.
const VISIBILITY_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Shortest window a visibility check gets, so a zero timeout still runs one check.
const MIN_VISIBILITY_WINDOW: Duration = Duration::from_millis(250);

/// Interval between document load checks after navigation.
const LOAD_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Reports the current document's load state.
const READY_STATE_SCRIPT: &str = "document.readyState";

/// DOM attribute used to tag located elements.
const HANDLE_ATTRIBUTE: &str = "data-stepshot-handle";

// ---------------------------------------------------------------------------
// Launcher
// ---------------------------------------------------------------------------

/// Starts CDP-backed browser sessions.
pub struct CdpLauncher {
    /// HTTP client for DevTools REST endpoints.
    client: reqwest::Client,
}

impl CdpLauncher {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .user_agent(concat!("stepshot/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();

        Self { client }
    }
}

impl Default for CdpLauncher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BrowserLauncher for CdpLauncher {
    async fn launch(&self, options: &LaunchOptions) -> Result<Box<dyn BrowserSession>> {
        let devtools = DevTools {
            client: self.client.clone(),
            base_url: devtools_base_url(options.debug_port),
        };

        let child = if devtools.is_reachable().await {
            info!(port = options.debug_port, "reusing running browser");
            None
        } else {
            Some(spawn_chrome(&devtools, options).await?)
        };

        let conn = Arc::new(CdpConnection {
            devtools,
            next_message_id: AtomicU64::new(1),
            slow_mo: options.slow_mo,
        });

        Ok(Box::new(CdpSession {
            conn,
            child,
            targets: Vec::new(),
        }))
    }
}

/// Spawn Chrome with remote debugging enabled and wait until it answers.
async fn spawn_chrome(devtools: &DevTools, options: &LaunchOptions) -> Result<Child> {
    let chrome_path = find_chrome_path(options.chrome_path.as_deref())?;

    info!(
        chrome_path = %chrome_path,
        port = options.debug_port,
        headless = options.headless,
        "launching Chrome with remote debugging"
    );

    let mut child = Command::new(&chrome_path)
        .args(chrome_args(options))
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| {
            AdapterError::LaunchFailed(format!("failed to start Chrome at `{chrome_path}`: {e}"))
        })?;

    let deadline = tokio::time::Instant::now() + Duration::from_secs(CHROME_STARTUP_TIMEOUT_SECS);
    loop {
        if devtools.is_reachable().await {
            info!("Chrome DevTools endpoint is reachable");
            return Ok(child);
        }
        if tokio::time::Instant::now() >= deadline {
            let _ = child.kill().await;
            return Err(AdapterError::Timeout {
                seconds: CHROME_STARTUP_TIMEOUT_SECS,
                reason: "Chrome did not start in time".into(),
            });
        }
        tokio::time::sleep(Duration::from_millis(250)).await;
    }
}

/// Command-line arguments for a spawned Chrome.
fn chrome_args(options: &LaunchOptions) -> Vec<String> {
    let profile_dir = std::env::temp_dir().join("stepshot-chrome-profile");
    let mut args = vec![
        format!("--remote-debugging-port={}", options.debug_port),
        format!("--user-data-dir={}", profile_dir.display()),
        "--no-first-run".to_string(),
        "--no-default-browser-check".to_string(),
        "--window-size=1280,800".to_string(),
    ];
    if options.headless {
        args.push("--headless=new".to_string());
    }
    args
}

/// Find the Chrome/Chromium executable path.
fn find_chrome_path(explicit: Option<&str>) -> Result<String> {
    if let Some(path) = explicit {
        return Ok(path.to_string());
    }

    let candidates = if cfg!(target_os = "macos") {
        vec![
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
            "/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge",
        ]
    } else if cfg!(target_os = "linux") {
        vec![
            "google-chrome",
            "google-chrome-stable",
            "chromium",
            "chromium-browser",
        ]
    } else {
        vec![]
    };

    for candidate in &candidates {
        let path = std::path::Path::new(candidate);
        if path.exists() || which_exists(candidate) {
            return Ok((*candidate).to_string());
        }
    }

    Err(AdapterError::LaunchFailed(
        "could not find Chrome/Chromium executable; set chrome_path manually".into(),
    ))
}

/// Check whether a command exists on the system PATH.
fn which_exists(name: &str) -> bool {
    std::process::Command::new("which")
        .arg(name)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Return the base URL for the DevTools HTTP endpoint.
fn devtools_base_url(port: u16) -> String {
    format!("http://localhost:{port}")
}

// ---------------------------------------------------------------------------
// DevTools HTTP endpoint
// ---------------------------------------------------------------------------

struct DevTools {
    client: reqwest::Client,
    base_url: String,
}

impl DevTools {
    async fn is_reachable(&self) -> bool {
        let url = format!("{}/json/version", self.base_url);
        self.client.get(&url).send().await.is_ok()
    }

    /// Open a blank page target, returning its id and WebSocket URL.
    async fn open_target(&self) -> Result<(String, String)> {
        let url = format!("{}/json/new?about:blank", self.base_url);
        let target: Value = self
            .client
            .put(&url)
            .send()
            .await
            .map_err(|e| AdapterError::ExecutionFailed {
                operation: "new_page".into(),
                reason: format!("failed to open target: {e}"),
            })?
            .json()
            .await
            .map_err(|e| AdapterError::ExecutionFailed {
                operation: "new_page".into(),
                reason: format!("failed to parse target: {e}"),
            })?;

        parse_target(&target)
    }

    async fn activate_target(&self, id: &str) -> Result<()> {
        let url = format!("{}/json/activate/{id}", self.base_url);
        self.client
            .get(&url)
            .send()
            .await
            .map_err(|e| AdapterError::ExecutionFailed {
                operation: "activate".into(),
                reason: e.to_string(),
            })?;
        Ok(())
    }

    async fn close_target(&self, id: &str) -> Result<()> {
        let url = format!("{}/json/close/{id}", self.base_url);
        self.client
            .get(&url)
            .send()
            .await
            .map_err(|e| AdapterError::ExecutionFailed {
                operation: "close".into(),
                reason: e.to_string(),
            })?;
        Ok(())
    }
}

/// Extract `(id, webSocketDebuggerUrl)` from a `/json/new` response.
fn parse_target(target: &Value) -> Result<(String, String)> {
    let field = |name: &str| {
        target
            .get(name)
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| AdapterError::ExecutionFailed {
                operation: "new_page".into(),
                reason: format!("page target has no `{name}`"),
            })
    };
    Ok((field("id")?, field("webSocketDebuggerUrl")?))
}

// ---------------------------------------------------------------------------
// CDP connection
// ---------------------------------------------------------------------------

/// State shared by a session and every page it opens.
struct CdpConnection {
    devtools: DevTools,
    /// Monotonically increasing CDP message ID.
    next_message_id: AtomicU64,
    slow_mo: Duration,
}

impl CdpConnection {
    fn next_id(&self) -> u64 {
        self.next_message_id.fetch_add(1, Ordering::Relaxed)
    }

    async fn pause(&self) {
        if !self.slow_mo.is_zero() {
            tokio::time::sleep(self.slow_mo).await;
        }
    }

    /// Send a CDP command over WebSocket and return the result.
    ///
    /// Opens a new WebSocket connection, sends the command, waits for the
    /// matching response (by message ID), and closes the connection.
    async fn send(&self, ws_url: &str, method: &str, params: Value) -> Result<Value> {
        let msg_id = self.next_id();

        debug!(method = method, msg_id = msg_id, "sending CDP command");

        let cdp_message = build_cdp_message(msg_id, method, params);

        let (ws_stream, _response) = tokio::time::timeout(
            Duration::from_secs(CDP_TIMEOUT_SECS),
            connect_async(ws_url),
        )
        .await
        .map_err(|_| AdapterError::Timeout {
            seconds: CDP_TIMEOUT_SECS,
            reason: format!("WebSocket connection to `{ws_url}` timed out"),
        })?
        .map_err(|e| AdapterError::ExecutionFailed {
            operation: method.into(),
            reason: format!("WebSocket connection failed: {e}"),
        })?;

        let (mut sink, mut stream) = ws_stream.split();

        let msg_text = serde_json::to_string(&cdp_message)?;
        sink.send(Message::Text(msg_text.into()))
            .await
            .map_err(|e| AdapterError::ExecutionFailed {
                operation: method.into(),
                reason: format!("failed to send CDP message: {e}"),
            })?;

        let result = tokio::time::timeout(Duration::from_secs(CDP_TIMEOUT_SECS), async {
            while let Some(msg_result) = stream.next().await {
                let msg = msg_result.map_err(|e| AdapterError::ExecutionFailed {
                    operation: method.into(),
                    reason: format!("WebSocket receive error: {e}"),
                })?;

                match msg {
                    Message::Text(text) => {
                        if text.len() > MAX_CDP_RESPONSE_BYTES {
                            return Err(AdapterError::ExecutionFailed {
                                operation: method.into(),
                                reason: format!(
                                    "CDP response too large: {} bytes (max {})",
                                    text.len(),
                                    MAX_CDP_RESPONSE_BYTES
                                ),
                            });
                        }

                        let response: Value =
                            serde_json::from_str(&text).map_err(AdapterError::from)?;
                        if response.get("id").and_then(|v| v.as_u64()) == Some(msg_id) {
                            if let Some(error) = response.get("error") {
                                let message = error
                                    .get("message")
                                    .and_then(|v| v.as_str())
                                    .unwrap_or("unknown CDP error");
                                return Err(AdapterError::Cdp {
                                    method: method.into(),
                                    message: message.into(),
                                });
                            }
                            return Ok(response.get("result").cloned().unwrap_or(json!({})));
                        }
                        // Event or another command's response; keep reading.
                    }
                    Message::Close(_) => {
                        return Err(AdapterError::ExecutionFailed {
                            operation: method.into(),
                            reason: "WebSocket closed before receiving CDP response".into(),
                        });
                    }
                    _ => {}
                }
            }

            Err(AdapterError::ExecutionFailed {
                operation: method.into(),
                reason: "WebSocket stream ended without CDP response".into(),
            })
        })
        .await
        .map_err(|_| AdapterError::Timeout {
            seconds: CDP_TIMEOUT_SECS,
            reason: format!("waiting for CDP response to `{method}`"),
        })?;

        // Best-effort close.
        let _ = sink.send(Message::Close(None)).await;

        result
    }
}

/// Build a CDP message JSON object.
pub fn build_cdp_message(id: u64, method: &str, params: Value) -> Value {
    json!({
        "id": id,
        "method": method,
        "params": params,
    })
}

/// Extract the value from a `Runtime.evaluate` CDP response.
///
/// The response shape is `{ "result": { "type": "...", "value": ... } }`;
/// evaluations that yield `undefined` have no `value` and map to `null`.
fn extract_runtime_value(cdp_result: &Value) -> Result<Value> {
    if let Some(exception) = cdp_result.get("exceptionDetails") {
        let exception_text = exception
            .get("exception")
            .and_then(|e| e.get("description"))
            .or_else(|| exception.get("text"))
            .and_then(|v| v.as_str())
            .unwrap_or("unknown exception");
        return Err(AdapterError::ExecutionFailed {
            operation: "evaluate".into(),
            reason: format!("JavaScript exception: {exception_text}"),
        });
    }

    let result_obj = cdp_result
        .get("result")
        .ok_or_else(|| AdapterError::ExecutionFailed {
            operation: "evaluate".into(),
            reason: "CDP response missing `result` field".into(),
        })?;

    Ok(result_obj.get("value").cloned().unwrap_or(Value::Null))
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

struct CdpSession {
    conn: Arc<CdpConnection>,
    /// Chrome process spawned by this session, if it did not reuse one.
    child: Option<Child>,
    /// Page targets opened by this session.
    targets: Vec<String>,
}

#[async_trait]
impl BrowserSession for CdpSession {
    async fn new_page(&mut self) -> Result<Box<dyn Page>> {
        let (id, ws_url) = self.conn.devtools.open_target().await?;
        if let Err(e) = self.conn.devtools.activate_target(&id).await {
            debug!(target_id = %id, error = %e, "could not activate target");
        }
        self.targets.push(id.clone());

        info!(target_id = %id, "opened page");

        Ok(Box::new(CdpPage {
            target: Arc::new(PageTarget {
                conn: Arc::clone(&self.conn),
                ws_url,
            }),
        }))
    }

    async fn close(&mut self) -> Result<()> {
        for id in self.targets.drain(..) {
            if let Err(e) = self.conn.devtools.close_target(&id).await {
                warn!(target_id = %id, error = %e, "failed to close page target");
            }
        }

        if let Some(mut child) = self.child.take() {
            child.kill().await?;
            info!("browser process terminated");
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Page and elements
// ---------------------------------------------------------------------------

struct PageTarget {
    conn: Arc<CdpConnection>,
    ws_url: String,
}

impl PageTarget {
    async fn send(&self, method: &str, params: Value) -> Result<Value> {
        self.conn.send(&self.ws_url, method, params).await
    }

    async fn evaluate(&self, expression: String) -> Result<Value> {
        let result = self
            .send(
                "Runtime.evaluate",
                json!({
                    "expression": expression,
                    "returnByValue": true,
                    "awaitPromise": true,
                }),
            )
            .await?;
        extract_runtime_value(&result)
    }
}

struct CdpPage {
    target: Arc<PageTarget>,
}

impl CdpPage {
    /// Tag up to `limit` matches of `pattern` and return their handle ids.
    async fn tag_matches(&self, pattern: &Pattern, limit: Option<usize>) -> Result<Vec<String>> {
        let script = locate_script(pattern, limit)?;
        let value = self.target.evaluate(script).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Poll `document.readyState` until the committed document has loaded.
    ///
    /// Evaluation errors while the new document is being set up count as
    /// "not loaded yet".
    async fn wait_for_load(&self, url: &str) -> Result<()> {
        let poll = async {
            loop {
                match self.target.evaluate(READY_STATE_SCRIPT.to_string()).await {
                    Ok(state) if is_document_loaded(&state) => return,
                    Ok(_) => {}
                    Err(e) => debug!(error = %e, "ready state check failed"),
                }
                tokio::time::sleep(LOAD_POLL_INTERVAL).await;
            }
        };

        tokio::time::timeout(Duration::from_secs(CDP_TIMEOUT_SECS), poll)
            .await
            .map_err(|_| AdapterError::Timeout {
                seconds: CDP_TIMEOUT_SECS,
                reason: format!("waiting for `{url}` to load"),
            })
    }

    fn element(&self, handle_id: String) -> Box<dyn ElementHandle> {
        Box::new(CdpElement {
            target: Arc::clone(&self.target),
            selector: handle_selector(&handle_id),
        })
    }
}

#[async_trait]
impl Page for CdpPage {
    async fn goto(&self, url: &str) -> Result<()> {
        url::Url::parse(url).map_err(|e| AdapterError::InvalidParams {
            operation: "goto".into(),
            reason: format!("invalid URL `{url}`: {e}"),
        })?;

        self.target.conn.pause().await;
        debug!(url = url, "navigating browser");

        let result = self.target.send("Page.navigate", json!({ "url": url })).await?;
        if let Some(error_text) = result.get("errorText").and_then(|v| v.as_str()) {
            return Err(AdapterError::ExecutionFailed {
                operation: "goto".into(),
                reason: format!("navigation to `{url}` failed: {error_text}"),
            });
        }

        self.wait_for_load(url).await?;
        info!(url = url, "navigation complete");
        Ok(())
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        let result = self
            .target
            .send("Page.captureScreenshot", json!({ "format": "png" }))
            .await?;

        let data = result.get("data").and_then(|v| v.as_str()).unwrap_or("");
        BASE64
            .decode(data)
            .map_err(|e| AdapterError::ExecutionFailed {
                operation: "screenshot".into(),
                reason: format!("invalid base64 image data: {e}"),
            })
    }

    async fn locate_first(&self, pattern: &Pattern) -> Result<Option<Box<dyn ElementHandle>>> {
        let ids = self.tag_matches(pattern, Some(1)).await?;
        Ok(ids.into_iter().next().map(|id| self.element(id)))
    }

    async fn locate_all(&self, pattern: &Pattern) -> Result<Vec<Box<dyn ElementHandle>>> {
        let ids = self.tag_matches(pattern, None).await?;
        Ok(ids.into_iter().map(|id| self.element(id)).collect())
    }
}

struct CdpElement {
    target: Arc<PageTarget>,
    selector: String,
}

#[async_trait]
impl ElementHandle for CdpElement {
    async fn is_visible(&self, timeout: Duration) -> Result<bool> {
        let script = element_script(
            &self.selector,
            "const r = el.getBoundingClientRect();
             const s = window.getComputedStyle(el);
             return r.width > 0 && r.height > 0
                 && s.visibility !== 'hidden' && s.display !== 'none';",
        )?;

        let poll = async {
            loop {
                let visible = self.target.evaluate(script.clone()).await?;
                if visible.as_bool() == Some(true) {
                    return Ok::<_, AdapterError>(true);
                }
                tokio::time::sleep(VISIBILITY_POLL_INTERVAL).await;
            }
        };

        match tokio::time::timeout(timeout.max(MIN_VISIBILITY_WINDOW), poll).await {
            Ok(result) => result,
            Err(_) => Ok(false),
        }
    }

    async fn click(&self) -> Result<()> {
        self.target.conn.pause().await;
        let script = element_script(
            &self.selector,
            "el.scrollIntoView({ block: 'center' }); el.click(); return true;",
        )?;
        let clicked = self.target.evaluate(script).await?;
        if clicked.as_bool() != Some(true) {
            return Err(AdapterError::ExecutionFailed {
                operation: "click".into(),
                reason: format!("element `{}` is no longer attached", self.selector),
            });
        }
        Ok(())
    }

    async fn fill(&self, text: &str) -> Result<()> {
        self.target.conn.pause().await;
        // Use the prototype's value setter so framework-controlled inputs
        // observe the change.
        let body = format!(
            "el.focus();
             const text = {text};
             const setter = Object.getOwnPropertyDescriptor(Object.getPrototypeOf(el), 'value');
             if (setter && setter.set) {{ setter.set.call(el, text); }} else {{ el.value = text; }}
             el.dispatchEvent(new Event('input', {{ bubbles: true }}));
             el.dispatchEvent(new Event('change', {{ bubbles: true }}));
             return true;",
            text = js_string(text)?
        );
        let filled = self
            .target
            .evaluate(element_script(&self.selector, &body)?)
            .await?;
        if filled.as_bool() != Some(true) {
            return Err(AdapterError::ExecutionFailed {
                operation: "fill".into(),
                reason: format!("element `{}` is no longer attached", self.selector),
            });
        }
        Ok(())
    }

    async fn get_attribute(&self, name: &str) -> Result<Option<String>> {
        let body = format!("return el.getAttribute({});", js_string(name)?);
        let value = self
            .target
            .evaluate(element_script(&self.selector, &body)?)
            .await?;
        Ok(match value {
            Value::Null => None,
            Value::String(s) => Some(s),
            other => Some(other.to_string()),
        })
    }
}

// ---------------------------------------------------------------------------
// Script builders
// ---------------------------------------------------------------------------

/// Whether a `document.readyState` value means the `load` event has fired.
fn is_document_loaded(state: &Value) -> bool {
    state.as_str() == Some("complete")
}

/// Encode `s` as a JavaScript string literal.
fn js_string(s: &str) -> Result<String> {
    Ok(serde_json::to_string(s)?)
}

fn handle_selector(handle_id: &str) -> String {
    format!("[{HANDLE_ATTRIBUTE}=\"{handle_id}\"]")
}

/// Wrap `body` in a function that binds `el` to the element matching
/// `selector`, returning `null` when it is gone.
fn element_script(selector: &str, body: &str) -> Result<String> {
    Ok(format!(
        "(() => {{
            const el = document.querySelector({selector});
            if (!el) return null;
            {body}
        }})()",
        selector = js_string(selector)?
    ))
}

/// Build a script that finds matches for `pattern`, tags the first `limit`
/// of them with a handle attribute, and returns the handle ids.
fn locate_script(pattern: &Pattern, limit: Option<usize>) -> Result<String> {
    let matcher = match pattern {
        Pattern::Css { selector } => {
            format!("Array.from(document.querySelectorAll({}))", js_string(selector)?)
        }
        // Unrendered elements are skipped.  Keep only the innermost matches,
        // the way a text locator resolves to the element that actually
        // carries the text.
        Pattern::TextMatches { regex } => format!(
            "(() => {{
                const re = new RegExp({regex}, 'i');
                const text = (el) => el.innerText || '';
                return Array.from(document.querySelectorAll('body *'))
                    .filter((el) => !el.closest('script,style,noscript,template'))
                    .filter((el) => re.test(text(el)))
                    .filter((el) => !Array.from(el.children).some((c) => re.test(text(c))));
            }})()",
            regex = js_string(regex)?
        ),
        Pattern::HasText { tag, text } => format!(
            "(() => {{
                const needle = {text}.toLowerCase();
                return Array.from(document.querySelectorAll({tag}))
                    .filter((el) => (el.innerText || el.textContent || '').toLowerCase().includes(needle));
            }})()",
            tag = js_string(tag)?,
            text = js_string(text)?
        ),
    };

    let limit = limit.map_or_else(|| "Infinity".to_string(), |n| n.to_string());

    Ok(format!(
        "(() => {{
            const found = {matcher};
            const ids = [];
            for (const el of found.slice(0, {limit})) {{
                if (!el.hasAttribute({attr})) {{
                    window.__stepshotNextHandle = (window.__stepshotNextHandle || 0) + 1;
                    el.setAttribute({attr}, String(window.__stepshotNextHandle));
                }}
                ids.push(el.getAttribute({attr}));
            }}
            return ids;
        }})()",
        attr = js_string(HANDLE_ATTRIBUTE)?
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
