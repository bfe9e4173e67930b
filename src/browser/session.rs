use std::io::{BufRead, BufReader, Read, Write};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::browser::driver::{PageDriver, SessionFactory};
use crate::browser::engine::BrowserEngine;
use crate::browser::viewport::ViewportConfig;
use crate::error::HarnessError;

pub const DEFAULT_DRIVER_SCRIPT: &str = "node/browser_server.js";

/// Bound on browser start-up, ready signal included.
pub const LAUNCH_TIMEOUT: Duration = Duration::from_secs(60);
/// Bound on an instantaneous element or URL read.
pub const QUERY_TIMEOUT: Duration = Duration::from_secs(10);
/// Bound on the driver acknowledging `quit` before it is killed.
pub const QUIT_TIMEOUT: Duration = Duration::from_secs(5);
/// Slack on top of a driver-side wait for the answer to travel back.
pub const RESPONSE_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

/// What a `query` request reads back from the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    Visible,
    Enabled,
    Text,
    Css,
    Attribute,
    ValidationMessage,
}

/// Request sent to the driver script over stdin (one JSON line).
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum BrowserRequest {
    Launch {
        cmd: &'static str,
        engine: BrowserEngine,
        #[serde(skip_serializing_if = "Option::is_none")]
        viewport: Option<ViewportSize>,
    },
    Navigate {
        cmd: &'static str,
        url: String,
        timeout_ms: u64,
    },
    Action {
        cmd: &'static str,
        action: &'static str,
        selector: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        value: Option<String>,
        timeout_ms: u64,
    },
    Query {
        cmd: &'static str,
        kind: QueryKind,
        selector: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    CurrentUrl {
        cmd: &'static str,
    },
    Quit {
        cmd: &'static str,
    },
}

impl BrowserRequest {
    pub fn launch(engine: BrowserEngine, viewport: Option<&ViewportConfig>) -> Self {
        BrowserRequest::Launch {
            cmd: "launch",
            engine,
            viewport: viewport.map(|v| ViewportSize {
                width: v.width,
                height: v.height,
            }),
        }
    }

    pub fn navigate(url: &str, timeout: Duration) -> Self {
        BrowserRequest::Navigate {
            cmd: "navigate",
            url: url.to_string(),
            timeout_ms: timeout.as_millis() as u64,
        }
    }

    pub fn click(selector: &str, timeout: Duration) -> Self {
        BrowserRequest::Action {
            cmd: "action",
            action: "click",
            selector: selector.to_string(),
            value: None,
            timeout_ms: timeout.as_millis() as u64,
        }
    }

    pub fn fill(selector: &str, value: &str, timeout: Duration) -> Self {
        BrowserRequest::Action {
            cmd: "action",
            action: "fill",
            selector: selector.to_string(),
            value: Some(value.to_string()),
            timeout_ms: timeout.as_millis() as u64,
        }
    }

    pub fn query(kind: QueryKind, selector: &str, name: Option<&str>) -> Self {
        BrowserRequest::Query {
            cmd: "query",
            kind,
            selector: selector.to_string(),
            name: name.map(|n| n.to_string()),
        }
    }

    pub fn current_url() -> Self {
        BrowserRequest::CurrentUrl { cmd: "current_url" }
    }

    pub fn quit() -> Self {
        BrowserRequest::Quit { cmd: "quit" }
    }
}

/// Response received from the driver script over stdout (one JSON line).
#[derive(Debug, Deserialize)]
pub struct BrowserResponse {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    /// `"timeout"` when a locator or navigation wait expired
    #[serde(default)]
    pub error_kind: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub ready: Option<bool>,
    #[serde(default)]
    pub value: Option<Value>,
}

impl BrowserResponse {
    pub fn is_timeout(&self) -> bool {
        self.error_kind.as_deref() == Some("timeout")
    }

    /// Query value as a boolean; null or missing reads as false.
    pub fn bool_value(&self) -> bool {
        self.value.as_ref().and_then(Value::as_bool).unwrap_or(false)
    }

    /// Query value as a string; null or missing reads as None.
    pub fn string_value(&self) -> Option<String> {
        self.value
            .as_ref()
            .and_then(Value::as_str)
            .map(|s| s.to_string())
    }
}

/// Lines from the driver's stdout, read on a background thread so every
/// wait for a response has a bound.
pub struct ResponseReader {
    lines: Receiver<std::io::Result<String>>,
}

impl ResponseReader {
    pub fn spawn<R: Read + Send + 'static>(source: R) -> Self {
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let mut reader = BufReader::new(source);
            loop {
                let mut line = String::new();
                match reader.read_line(&mut line) {
                    Ok(0) => break,
                    Ok(_) => {
                        if tx.send(Ok(line)).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        let _ = tx.send(Err(e));
                        break;
                    }
                }
            }
        });
        Self { lines: rx }
    }

    /// Next response line, parsed. Waits at most `timeout`.
    pub fn next(&self, context: &str, timeout: Duration) -> Result<BrowserResponse, HarnessError> {
        let line = match self.lines.recv_timeout(timeout) {
            Ok(Ok(line)) => line,
            Ok(Err(e)) => {
                return Err(HarnessError::SessionIo(format!(
                    "Failed to read {}: {}",
                    context, e
                )));
            }
            Err(RecvTimeoutError::Timeout) => {
                return Err(HarnessError::DriverUnresponsive {
                    context: context.to_string(),
                    timeout_ms: timeout.as_millis() as u64,
                });
            }
            Err(RecvTimeoutError::Disconnected) => String::new(),
        };

        if line.trim().is_empty() {
            return Err(HarnessError::SessionIo(format!(
                "Empty {} from driver (process may have died)",
                context
            )));
        }

        serde_json::from_str(line.trim()).map_err(|e| HarnessError::JsonParse {
            context: format!("driver {}", context),
            source: e,
        })
    }
}

/// A browser context backed by a Node.js Playwright process.
///
/// Commands are NDJSON over stdin, responses NDJSON over stdout. One
/// process per session keeps contexts isolated; dropping the session quits
/// the browser. A driver that stops answering is killed, which ends the
/// session.
pub struct BrowserSession {
    child: Child,
    stdin: std::process::ChildStdin,
    reader: ResponseReader,
    closed: bool,
}

impl BrowserSession {
    /// Spawn the driver script and open a page with the given engine and
    /// viewport.
    pub fn launch(
        script: &str,
        engine: BrowserEngine,
        viewport: Option<&ViewportConfig>,
    ) -> Result<Self, HarnessError> {
        let mut child = Command::new("node")
            .arg(script)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| HarnessError::SubprocessSpawn {
                script: script.to_string(),
                source: e,
            })?;

        let stdin = child.stdin.take().ok_or_else(|| {
            HarnessError::SessionIo(format!("Failed to capture stdin of {}", script))
        })?;

        let stdout = child.stdout.take().ok_or_else(|| {
            HarnessError::SessionIo(format!("Failed to capture stdout of {}", script))
        })?;

        let mut session = BrowserSession {
            child,
            stdin,
            reader: ResponseReader::spawn(stdout),
            closed: false,
        };

        let response = session.read_response("ready signal", LAUNCH_TIMEOUT)?;
        if !response.ok || response.ready != Some(true) {
            return Err(HarnessError::SessionProtocol {
                command: "launch".into(),
                error: format!("Did not receive ready signal from {}", script),
            });
        }

        session.send_ok(&BrowserRequest::launch(engine, viewport), "launch", LAUNCH_TIMEOUT)?;
        debug!(%engine, viewport = ?viewport.map(|v| &v.name), "browser session launched");
        Ok(session)
    }

    fn read_response(
        &mut self,
        context: &str,
        timeout: Duration,
    ) -> Result<BrowserResponse, HarnessError> {
        let response = self.reader.next(context, timeout);
        if let Err(HarnessError::DriverUnresponsive { .. }) = &response {
            // A late answer would be read as the reply to the next request
            warn!("driver unresponsive, killing pid {}", self.child.id());
            self.kill();
        }
        response
    }

    /// Send a request and read the response, waiting at most `timeout`.
    fn send(
        &mut self,
        request: &BrowserRequest,
        timeout: Duration,
    ) -> Result<BrowserResponse, HarnessError> {
        let json = serde_json::to_string(request).map_err(|e| HarnessError::JsonSerialize {
            context: "BrowserRequest".into(),
            source: e,
        })?;

        writeln!(self.stdin, "{}", json).map_err(|e| {
            HarnessError::SessionIo(format!("Failed to write to driver stdin: {}", e))
        })?;

        self.stdin.flush().map_err(|e| {
            HarnessError::SessionIo(format!("Failed to flush driver stdin: {}", e))
        })?;

        self.read_response("response", timeout)
    }

    /// Send a request and verify it succeeded.
    fn send_ok(
        &mut self,
        request: &BrowserRequest,
        command_name: &str,
        timeout: Duration,
    ) -> Result<BrowserResponse, HarnessError> {
        let response = self.send(request, timeout)?;
        if !response.ok {
            return Err(HarnessError::SessionProtocol {
                command: command_name.into(),
                error: response.error.unwrap_or_else(|| "Unknown error".into()),
            });
        }
        Ok(response)
    }

    /// Send an interaction; a driver-side wait expiry becomes a locate timeout.
    fn send_action(
        &mut self,
        request: &BrowserRequest,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), HarnessError> {
        let response = self.send(request, timeout + RESPONSE_GRACE)?;
        if response.ok {
            return Ok(());
        }
        if response.is_timeout() {
            return Err(HarnessError::LocateTimeout {
                selector: selector.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            });
        }
        Err(HarnessError::SessionProtocol {
            command: "action".into(),
            error: response.error.unwrap_or_else(|| "Unknown error".into()),
        })
    }

    fn query(
        &mut self,
        kind: QueryKind,
        selector: &str,
        name: Option<&str>,
    ) -> Result<BrowserResponse, HarnessError> {
        self.send_ok(&BrowserRequest::query(kind, selector, name), "query", QUERY_TIMEOUT)
    }

    fn kill(&mut self) {
        self.closed = true;
        let _ = self.child.kill();
        let _ = self.child.wait();
    }

    /// Quit the browser session, killing the driver if it does not
    /// acknowledge in time.
    pub fn quit(&mut self) -> Result<(), HarnessError> {
        if self.closed {
            return Ok(());
        }
        match self.send(&BrowserRequest::quit(), QUIT_TIMEOUT) {
            Ok(_) => {
                self.closed = true;
                let _ = self.child.wait();
            }
            Err(e) => {
                warn!("driver did not acknowledge quit: {}", e);
                self.kill();
            }
        }
        Ok(())
    }
}

impl PageDriver for BrowserSession {
    fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), HarnessError> {
        let response = self.send(&BrowserRequest::navigate(url, timeout), timeout + RESPONSE_GRACE)?;
        if response.ok {
            return Ok(());
        }
        if response.is_timeout() {
            return Err(HarnessError::NavigationTimeout {
                url: url.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            });
        }
        Err(HarnessError::SessionProtocol {
            command: "navigate".into(),
            error: response.error.unwrap_or_else(|| "Unknown error".into()),
        })
    }

    fn click(&mut self, selector: &str, timeout: Duration) -> Result<(), HarnessError> {
        self.send_action(&BrowserRequest::click(selector, timeout), selector, timeout)
    }

    fn fill(&mut self, selector: &str, value: &str, timeout: Duration) -> Result<(), HarnessError> {
        self.send_action(&BrowserRequest::fill(selector, value, timeout), selector, timeout)
    }

    fn current_url(&mut self) -> Result<String, HarnessError> {
        let response =
            self.send_ok(&BrowserRequest::current_url(), "current_url", QUERY_TIMEOUT)?;
        response.url.ok_or_else(|| HarnessError::SessionProtocol {
            command: "current_url".into(),
            error: "No URL in current_url response".into(),
        })
    }

    fn is_visible(&mut self, selector: &str) -> Result<bool, HarnessError> {
        Ok(self.query(QueryKind::Visible, selector, None)?.bool_value())
    }

    fn is_enabled(&mut self, selector: &str) -> Result<bool, HarnessError> {
        Ok(self.query(QueryKind::Enabled, selector, None)?.bool_value())
    }

    fn text_content(&mut self, selector: &str) -> Result<Option<String>, HarnessError> {
        Ok(self.query(QueryKind::Text, selector, None)?.string_value())
    }

    fn computed_style(
        &mut self,
        selector: &str,
        property: &str,
    ) -> Result<Option<String>, HarnessError> {
        Ok(self.query(QueryKind::Css, selector, Some(property))?.string_value())
    }

    fn attribute(&mut self, selector: &str, name: &str) -> Result<Option<String>, HarnessError> {
        Ok(self.query(QueryKind::Attribute, selector, Some(name))?.string_value())
    }

    fn validation_message(&mut self, selector: &str) -> Result<Option<String>, HarnessError> {
        Ok(self
            .query(QueryKind::ValidationMessage, selector, None)?
            .string_value())
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        let _ = self.quit();
    }
}

/// Opens one `BrowserSession` process per scenario case.
#[derive(Debug, Clone)]
pub struct NodeSessionFactory {
    pub script: String,
}

impl NodeSessionFactory {
    pub fn new(script: &str) -> Self {
        Self {
            script: script.to_string(),
        }
    }
}

impl SessionFactory for NodeSessionFactory {
    fn open(
        &self,
        engine: BrowserEngine,
        viewport: Option<&ViewportConfig>,
    ) -> Result<Box<dyn PageDriver>, HarnessError> {
        Ok(Box::new(BrowserSession::launch(&self.script, engine, viewport)?))
    }
}
