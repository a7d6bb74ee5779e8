use serde_json::Value;
use tracing::{debug, warn};

use crate::browser::driver::Browser;
use crate::browser::protocol::ElementRef;
use crate::error::E2eResult;

pub const SCROLL_INTO_VIEW_SCRIPT: &str = "arguments[0].scrollIntoView({block: 'center'});";

pub const FORCED_CLICK_SCRIPT: &str = "arguments[0].click();";

/// Sets `value` through the prototype setter so framework-controlled inputs
/// notice the change, then fires `input` and `change`.
/// Arguments: element, text, replace (bool).
pub const FORCED_SET_VALUE_SCRIPT: &str = r#"const el = arguments[0];
const text = arguments[1];
const replace = arguments[2];
const proto = el instanceof HTMLTextAreaElement
  ? HTMLTextAreaElement.prototype
  : HTMLInputElement.prototype;
const setter = Object.getOwnPropertyDescriptor(proto, 'value').set;
setter.call(el, replace ? text : el.value + text);
el.dispatchEvent(new Event('input', { bubbles: true }));
el.dispatchEvent(new Event('change', { bubbles: true }));"#;

/// WebDriver key codes
const KEY_NULL: char = '\u{E000}';
const KEY_CONTROL: char = '\u{E009}';
const KEY_DELETE: char = '\u{E017}';

/// How an action reaches the element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionMode {
    /// Native WebDriver input, subject to occlusion and interactability checks
    Standard,
    /// Dispatched by script on the element itself, bypassing those checks
    Forced,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Click,
    /// Append text to the current value
    Type(String),
    /// Clear the control, then type
    ClearAndType(String),
    /// Select-all + delete through the keyboard, then type. Some editors
    /// ignore a programmatic clear and restore their old value.
    ReplaceText(String),
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Click => "click",
            Action::Type(_) => "type",
            Action::ClearAndType(_) => "clear+type",
            Action::ReplaceText(_) => "replace",
        }
    }
}

pub fn scroll_into_view(browser: &mut dyn Browser, element: &ElementRef) -> E2eResult<()> {
    browser.execute_script(SCROLL_INTO_VIEW_SCRIPT, vec![element.to_json()])?;
    Ok(())
}

/// Scroll the element to the viewport centre, then run the action in `mode`.
pub fn perform(
    browser: &mut dyn Browser,
    element: &ElementRef,
    action: &Action,
    mode: ActionMode,
) -> E2eResult<()> {
    scroll_into_view(browser, element)?;
    debug!(%element, action = action.name(), ?mode, "perform");

    match mode {
        ActionMode::Standard => perform_standard(browser, element, action),
        ActionMode::Forced => perform_forced(browser, element, action),
    }
}

/// Try the action natively; if the browser refuses it with an interaction
/// error, redo it in forced mode. Returns the mode that succeeded.
pub fn perform_with_fallback(
    browser: &mut dyn Browser,
    element: &ElementRef,
    action: &Action,
) -> E2eResult<ActionMode> {
    match perform(browser, element, action, ActionMode::Standard) {
        Ok(()) => Ok(ActionMode::Standard),
        Err(e) if e.is_interaction_failure() => {
            warn!(%element, action = action.name(), error = %e, "standard action refused; forcing");
            perform(browser, element, action, ActionMode::Forced)?;
            Ok(ActionMode::Forced)
        }
        Err(e) => Err(e),
    }
}

fn perform_standard(browser: &mut dyn Browser, element: &ElementRef, action: &Action) -> E2eResult<()> {
    match action {
        Action::Click => browser.click(element),
        Action::Type(text) => browser.send_keys(element, text),
        Action::ClearAndType(text) => {
            browser.clear(element)?;
            browser.send_keys(element, text)
        }
        Action::ReplaceText(text) => {
            let select_all = format!("{}a{}", KEY_CONTROL, KEY_NULL);
            browser.send_keys(element, &select_all)?;
            browser.send_keys(element, &KEY_DELETE.to_string())?;
            browser.send_keys(element, text)
        }
    }
}

fn perform_forced(browser: &mut dyn Browser, element: &ElementRef, action: &Action) -> E2eResult<()> {
    let (text, replace) = match action {
        Action::Click => {
            browser.execute_script(FORCED_CLICK_SCRIPT, vec![element.to_json()])?;
            return Ok(());
        }
        Action::Type(text) => (text, false),
        Action::ClearAndType(text) | Action::ReplaceText(text) => (text, true),
    };
    browser.execute_script(
        FORCED_SET_VALUE_SCRIPT,
        vec![element.to_json(), Value::from(text.as_str()), Value::Bool(replace)],
    )?;
    Ok(())
}
