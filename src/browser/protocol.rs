use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Key under which W3C WebDriver serializes a web element reference.
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52f-4fbf2ef3c4ea";

/// Locator strategies understood by WebDriver's find-element endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    #[serde(rename = "css selector")]
    Css,
    #[serde(rename = "xpath")]
    XPath,
    #[serde(rename = "tag name")]
    TagName,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Css => "css",
            Strategy::XPath => "xpath",
            Strategy::TagName => "tag",
        }
    }
}

/// A strategy + selector pair. Serializes to the `{using, value}` body of
/// `POST /session/{id}/elements`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    #[serde(rename = "using")]
    pub strategy: Strategy,
    #[serde(rename = "value")]
    pub selector: String,
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Self {
            strategy: Strategy::Css,
            selector: selector.into(),
        }
    }

    pub fn xpath(selector: impl Into<String>) -> Self {
        Self {
            strategy: Strategy::XPath,
            selector: selector.into(),
        }
    }

    pub fn tag(name: impl Into<String>) -> Self {
        Self {
            strategy: Strategy::TagName,
            selector: name.into(),
        }
    }

    /// WebDriver has no id strategy; ids go through an attribute selector so
    /// that ids starting with digits stay valid CSS.
    pub fn id(id: &str) -> Self {
        Self::css(format!("[id=\"{}\"]", id))
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.strategy.as_str(), self.selector)
    }
}

/// Opaque handle to an element living in the browser.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementRef(pub String);

impl ElementRef {
    pub fn id(&self) -> &str {
        &self.0
    }

    /// JSON form used when passing the element as a script argument.
    pub fn to_json(&self) -> Value {
        serde_json::json!({ ELEMENT_KEY: self.0 })
    }

    /// Parse an element reference out of a WebDriver value (find or script result).
    pub fn from_json(value: &Value) -> Option<Self> {
        value
            .get(ELEMENT_KEY)
            .and_then(Value::as_str)
            .map(|id| ElementRef(id.to_string()))
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "element {}", self.0)
    }
}

// ============================================================================
// Request bodies
// ============================================================================

#[derive(Debug, Serialize)]
pub struct NewSessionRequest {
    pub capabilities: Capabilities,
}

#[derive(Debug, Serialize)]
pub struct Capabilities {
    #[serde(rename = "alwaysMatch")]
    pub always_match: Value,
}

#[derive(Debug, Serialize)]
pub struct NavigateRequest<'a> {
    pub url: &'a str,
}

#[derive(Debug, Serialize)]
pub struct SendKeysRequest<'a> {
    pub text: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ExecuteScriptRequest<'a> {
    pub script: &'a str,
    pub args: Vec<Value>,
}

#[derive(Debug, Serialize)]
pub struct WindowRectRequest {
    pub width: u32,
    pub height: u32,
}

// ============================================================================
// Responses
// ============================================================================

/// Every WebDriver response wraps its payload in `{"value": ...}`.
#[derive(Debug, Deserialize)]
pub struct WireResponse {
    #[serde(default)]
    pub value: Value,
}

/// Error payload found in `value` for non-2xx responses.
#[derive(Debug, Deserialize)]
pub struct WireError {
    pub error: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct NewSessionValue {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    #[serde(default)]
    pub capabilities: Value,
}

/// Payload of `GET /status`.
#[derive(Debug, Deserialize)]
pub struct StatusValue {
    #[serde(default)]
    pub ready: bool,
    #[serde(default)]
    pub message: String,
}
