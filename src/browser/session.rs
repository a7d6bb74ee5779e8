use std::time::Duration;

use reqwest::Method;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::browser::driver::Browser;
use crate::browser::protocol::{
    Capabilities, ElementRef, ExecuteScriptRequest, Locator, NavigateRequest, NewSessionRequest,
    NewSessionValue, SendKeysRequest, StatusValue, WindowRectRequest, WireError, WireResponse,
};
use crate::error::{E2eError, E2eResult};

/// Which browser the WebDriver server should start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BrowserKind {
    Firefox,
    Chrome,
}

impl BrowserKind {
    /// `alwaysMatch` capabilities for a new session.
    pub fn capabilities(&self, headless: bool, width: u32, height: u32) -> Value {
        match self {
            BrowserKind::Firefox => {
                let mut args = Vec::new();
                if headless {
                    args.push("-headless".to_string());
                }
                args.push(format!("--width={}", width));
                args.push(format!("--height={}", height));
                json!({
                    "browserName": "firefox",
                    "moz:firefoxOptions": { "args": args },
                })
            }
            BrowserKind::Chrome => {
                let mut args = vec!["--no-sandbox".to_string()];
                if headless {
                    args.push("--headless=new".to_string());
                    args.push("--disable-gpu".to_string());
                    args.push("--disable-dev-shm-usage".to_string());
                }
                args.push(format!("--window-size={},{}", width, height));
                json!({
                    "browserName": "chrome",
                    "goog:chromeOptions": { "args": args },
                })
            }
        }
    }
}

/// How to reach the WebDriver server and shape the browser window.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub webdriver_url: String,
    pub browser: BrowserKind,
    pub headless: bool,
    pub window_width: u32,
    pub window_height: u32,
    /// Upper bound for a single WebDriver HTTP round trip
    pub request_timeout: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:4444".to_string(),
            browser: BrowserKind::Firefox,
            headless: false,
            window_width: 1280,
            window_height: 900,
            request_timeout: Duration::from_secs(60),
        }
    }
}

/// A browser session driven over the W3C WebDriver HTTP protocol.
///
/// Each command is one HTTP request against `{webdriver_url}/session/{id}`;
/// responses carry their payload (or an error object) under `value`.
pub struct WebDriverSession {
    client: Client,
    session_url: String,
    session_id: String,
    closed: bool,
}

impl WebDriverSession {
    /// Start a new browser session and size its window.
    pub fn launch(options: &SessionOptions) -> E2eResult<Self> {
        let client = Client::builder().timeout(options.request_timeout).build()?;
        let root = options.webdriver_url.trim_end_matches('/').to_string();

        let request = NewSessionRequest {
            capabilities: Capabilities {
                always_match: options.browser.capabilities(
                    options.headless,
                    options.window_width,
                    options.window_height,
                ),
            },
        };

        let value = send(
            &client,
            Method::POST,
            &format!("{}/session", root),
            Some(json!(request)),
            "new session",
            None,
        )?;
        let created: NewSessionValue =
            serde_json::from_value(value).map_err(|e| E2eError::Protocol {
                command: "new session".into(),
                detail: e.to_string(),
            })?;

        info!(
            session = %created.session_id,
            browser = ?options.browser,
            "webdriver session started"
        );
        debug!(capabilities = %created.capabilities, "negotiated capabilities");

        let mut session = WebDriverSession {
            client,
            session_url: format!("{}/session/{}", root, created.session_id),
            session_id: created.session_id,
            closed: false,
        };
        session.set_window_size(options.window_width, options.window_height)?;
        Ok(session)
    }

    /// Query `GET /status` on a WebDriver server without opening a session.
    pub fn status(webdriver_url: &str, timeout: Duration) -> E2eResult<StatusValue> {
        let client = Client::builder().timeout(timeout).build()?;
        let url = format!("{}/status", webdriver_url.trim_end_matches('/'));
        let value = send(&client, Method::GET, &url, None, "status", None)?;
        serde_json::from_value(value).map_err(|e| E2eError::Protocol {
            command: "status".into(),
            detail: e.to_string(),
        })
    }

    fn command(&self, method: Method, path: &str, body: Option<Value>, name: &str) -> E2eResult<Value> {
        let url = format!("{}{}", self.session_url, path);
        send(&self.client, method, &url, body, name, None)
    }

    fn element_command(
        &self,
        method: Method,
        element: &ElementRef,
        suffix: &str,
        body: Option<Value>,
        name: &str,
    ) -> E2eResult<Value> {
        let url = format!("{}/element/{}{}", self.session_url, element.id(), suffix);
        send(&self.client, method, &url, body, name, Some(element))
    }

    fn expect_bool(value: Value, command: &str) -> E2eResult<bool> {
        value.as_bool().ok_or_else(|| E2eError::Protocol {
            command: command.into(),
            detail: format!("expected boolean, got {}", value),
        })
    }

    fn expect_elements(value: Value, command: &str) -> E2eResult<Vec<ElementRef>> {
        let items = value.as_array().ok_or_else(|| E2eError::Protocol {
            command: command.into(),
            detail: format!("expected element array, got {}", value),
        })?;
        items
            .iter()
            .map(|item| {
                ElementRef::from_json(item).ok_or_else(|| E2eError::Protocol {
                    command: command.into(),
                    detail: format!("not an element reference: {}", item),
                })
            })
            .collect()
    }
}

/// Send one WebDriver request and unwrap its `value`, mapping error payloads.
fn send(
    client: &Client,
    method: Method,
    url: &str,
    body: Option<Value>,
    command: &str,
    element: Option<&ElementRef>,
) -> E2eResult<Value> {
    let mut request = client.request(method, url);
    if let Some(body) = body {
        request = request.json(&body);
    }

    let response = request.send()?;
    let status = response.status();
    let text = response.text()?;

    let parsed: WireResponse = serde_json::from_str(&text).map_err(|e| E2eError::Protocol {
        command: command.into(),
        detail: format!("{} (status {}, body: {})", e, status, text),
    })?;

    if status.is_success() {
        return Ok(parsed.value);
    }

    match serde_json::from_value::<WireError>(parsed.value) {
        Ok(err) => {
            let element_name = element.map(|e| e.to_string());
            Err(E2eError::from_wire(
                command,
                element_name.as_deref(),
                &err.error,
                &err.message,
            ))
        }
        Err(_) => Err(E2eError::Protocol {
            command: command.into(),
            detail: format!("status {} without error payload: {}", status, text),
        }),
    }
}

impl Browser for WebDriverSession {
    fn navigate(&mut self, url: &str) -> E2eResult<()> {
        debug!(url, "navigate");
        self.command(Method::POST, "/url", Some(json!(NavigateRequest { url })), "navigate")?;
        Ok(())
    }

    fn current_url(&mut self) -> E2eResult<String> {
        let value = self.command(Method::GET, "/url", None, "current url")?;
        value.as_str().map(str::to_string).ok_or_else(|| E2eError::Protocol {
            command: "current url".into(),
            detail: format!("expected string, got {}", value),
        })
    }

    fn find_all(&mut self, locator: &Locator) -> E2eResult<Vec<ElementRef>> {
        let value = self.command(Method::POST, "/elements", Some(json!(locator)), "find elements")?;
        Self::expect_elements(value, "find elements")
    }

    fn find_all_within(&mut self, parent: &ElementRef, locator: &Locator) -> E2eResult<Vec<ElementRef>> {
        let value = self.element_command(
            Method::POST,
            parent,
            "/elements",
            Some(json!(locator)),
            "find elements from element",
        )?;
        Self::expect_elements(value, "find elements from element")
    }

    fn is_displayed(&mut self, element: &ElementRef) -> E2eResult<bool> {
        let value = self.element_command(Method::GET, element, "/displayed", None, "is displayed")?;
        Self::expect_bool(value, "is displayed")
    }

    fn is_enabled(&mut self, element: &ElementRef) -> E2eResult<bool> {
        let value = self.element_command(Method::GET, element, "/enabled", None, "is enabled")?;
        Self::expect_bool(value, "is enabled")
    }

    fn text(&mut self, element: &ElementRef) -> E2eResult<String> {
        let value = self.element_command(Method::GET, element, "/text", None, "element text")?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    fn attribute(&mut self, element: &ElementRef, name: &str) -> E2eResult<Option<String>> {
        let suffix = format!("/attribute/{}", name);
        let value = self.element_command(Method::GET, element, &suffix, None, "element attribute")?;
        Ok(match value {
            Value::Null => None,
            Value::String(s) => Some(s),
            other => Some(other.to_string()),
        })
    }

    fn property(&mut self, element: &ElementRef, name: &str) -> E2eResult<Value> {
        let suffix = format!("/property/{}", name);
        self.element_command(Method::GET, element, &suffix, None, "element property")
    }

    // Parameterless POST commands still need an empty JSON object body
    fn click(&mut self, element: &ElementRef) -> E2eResult<()> {
        self.element_command(Method::POST, element, "/click", Some(json!({})), "element click")?;
        Ok(())
    }

    fn clear(&mut self, element: &ElementRef) -> E2eResult<()> {
        self.element_command(Method::POST, element, "/clear", Some(json!({})), "element clear")?;
        Ok(())
    }

    fn send_keys(&mut self, element: &ElementRef, text: &str) -> E2eResult<()> {
        self.element_command(
            Method::POST,
            element,
            "/value",
            Some(json!(SendKeysRequest { text })),
            "element send keys",
        )?;
        Ok(())
    }

    fn execute_script(&mut self, script: &str, args: Vec<Value>) -> E2eResult<Value> {
        let body = ExecuteScriptRequest { script, args };
        self.command(Method::POST, "/execute/sync", Some(json!(body)), "execute script")
    }

    fn set_window_size(&mut self, width: u32, height: u32) -> E2eResult<()> {
        let body = WindowRectRequest { width, height };
        self.command(Method::POST, "/window/rect", Some(json!(body)), "set window rect")?;
        Ok(())
    }

    fn quit(&mut self) -> E2eResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.command(Method::DELETE, "", None, "delete session")?;
        info!(session = %self.session_id, "webdriver session closed");
        Ok(())
    }
}

impl Drop for WebDriverSession {
    fn drop(&mut self) {
        if let Err(e) = self.quit() {
            warn!(session = %self.session_id, error = %e, "failed to close webdriver session");
        }
    }
}
