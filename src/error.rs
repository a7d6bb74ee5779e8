use std::time::Duration;

use thiserror::Error;

/// WebDriver error codes that mean "the element exists but could not be acted on".
const INTERACTION_CODES: &[&str] = &[
    "element click intercepted",
    "element not interactable",
    "stale element reference",
    "invalid element state",
];

/// WebDriver error codes a poll may treat as "condition not true yet".
const TRANSIENT_CODES: &[&str] = &["no such element", "stale element reference"];

#[derive(Debug, Error)]
pub enum E2eError {
    /// Every locator candidate timed out without yielding an actionable element
    #[error("no matching element for {target}; tried: {}", .attempted.join(" | "))]
    LocatorExhausted { target: String, attempted: Vec<String> },

    /// The element was found but the browser refused the action
    #[error("interaction with {element} failed ({code}): {message}")]
    Interaction {
        element: String,
        code: String,
        message: String,
    },

    /// A polled condition never became true
    #[error("condition not met within {}ms: {condition}", .timeout.as_millis())]
    ConditionTimeout { condition: String, timeout: Duration },

    /// The scenario's verdict on the observed final state
    #[error("assertion failed: {0}")]
    Assertion(String),

    /// WebDriver answered with an error payload
    #[error("webdriver {command} failed ({code}): {message}")]
    WebDriver {
        command: String,
        code: String,
        message: String,
    },

    /// WebDriver answered with something we could not interpret
    #[error("unexpected webdriver response to {command}: {detail}")]
    Protocol { command: String, detail: String },

    #[error("{what} at {url} is not reachable: {reason}")]
    Unreachable {
        what: String,
        url: String,
        reason: String,
    },

    #[error("unknown scenario '{0}'")]
    UnknownScenario(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type E2eResult<T> = Result<T, E2eError>;

/// Coarse failure classes used in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCategory {
    LocatorExhaustion,
    Interaction,
    ConditionTimeout,
    Assertion,
    Infrastructure,
}

impl FailureCategory {
    /// Stable identifier, matching the serialized form.
    pub fn code(&self) -> &'static str {
        match self {
            FailureCategory::LocatorExhaustion => "locator_exhaustion",
            FailureCategory::Interaction => "interaction",
            FailureCategory::ConditionTimeout => "condition_timeout",
            FailureCategory::Assertion => "assertion",
            FailureCategory::Infrastructure => "infrastructure",
        }
    }
}

impl std::fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FailureCategory::LocatorExhaustion => "locator exhaustion",
            FailureCategory::Interaction => "interaction failure",
            FailureCategory::ConditionTimeout => "condition timeout",
            FailureCategory::Assertion => "assertion failure",
            FailureCategory::Infrastructure => "infrastructure",
        };
        f.write_str(name)
    }
}

impl E2eError {
    /// Build the right variant for a WebDriver error code.
    pub fn from_wire(command: &str, element: Option<&str>, code: &str, message: &str) -> Self {
        if INTERACTION_CODES.contains(&code) {
            E2eError::Interaction {
                element: element.unwrap_or(command).to_string(),
                code: code.to_string(),
                message: message.to_string(),
            }
        } else {
            E2eError::WebDriver {
                command: command.to_string(),
                code: code.to_string(),
                message: message.to_string(),
            }
        }
    }

    pub fn category(&self) -> FailureCategory {
        match self {
            E2eError::LocatorExhausted { .. } => FailureCategory::LocatorExhaustion,
            E2eError::Interaction { .. } => FailureCategory::Interaction,
            E2eError::ConditionTimeout { .. } => FailureCategory::ConditionTimeout,
            E2eError::Assertion(_) => FailureCategory::Assertion,
            _ => FailureCategory::Infrastructure,
        }
    }

    /// True when the forced action path may still succeed.
    pub fn is_interaction_failure(&self) -> bool {
        matches!(self, E2eError::Interaction { .. })
    }

    /// True for errors caused by the DOM changing under a lookup.
    pub fn is_transient(&self) -> bool {
        match self {
            E2eError::Interaction { code, .. } | E2eError::WebDriver { code, .. } => {
                TRANSIENT_CODES.contains(&code.as_str())
            }
            _ => false,
        }
    }
}
