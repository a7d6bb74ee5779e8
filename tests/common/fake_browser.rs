use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use serde_json::Value;

use marketplace_e2e::browser::driver::Browser;
use marketplace_e2e::browser::protocol::{ElementRef, Locator};
use marketplace_e2e::error::{E2eError, E2eResult};
use marketplace_e2e::interact::executor::{
    FORCED_CLICK_SCRIPT, FORCED_SET_VALUE_SCRIPT, SCROLL_INTO_VIEW_SCRIPT,
};
use marketplace_e2e::scenario::context::WaitConfig;
use marketplace_e2e::scenario::runner::SessionFactory;

/// Same root as `Fixture::default()`.
pub const BASE_URL: &str = "http://localhost:5173";

const KEY_CONTROL: char = '\u{E009}';
const KEY_DELETE: char = '\u{E017}';

/// Waits short enough for tests, long enough for several polls.
pub fn fast_waits() -> WaitConfig {
    WaitConfig {
        default_timeout: Duration::from_millis(200),
        candidate_timeout: Duration::from_millis(50),
        toast_timeout: Duration::from_millis(50),
        poll_interval: Duration::from_millis(5),
        settle_delay: Duration::ZERO,
    }
}

// ============================================================================
// Scripted page model
// ============================================================================

/// What clicking an element does to the page.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Go to an application route
    Navigate(String),
    Attach(String),
    Detach(String),
    SetValue(String, String),
}

/// One element of the fake page. It answers to every selector in `selectors`
/// (strategy is ignored) while attached and, when `route` is set, only while
/// the browser is on that route.
#[derive(Debug, Clone)]
pub struct FakeElement {
    pub key: String,
    pub selectors: Vec<String>,
    pub route: Option<String>,
    pub parent: Option<String>,
    pub attached: bool,
    pub displayed: bool,
    pub enabled: bool,
    pub disabled_attr: Option<String>,
    pub text: String,
    pub value: String,
    pub on_click: Vec<Effect>,
    /// Error codes returned by the next native clicks, in order
    pub click_errors: Vec<String>,
    /// Clicks (native or forced) that are accepted but do nothing
    pub inert_clicks: usize,
    /// Lookups that miss the element before it shows up
    pub hidden_lookups: usize,
}

impl FakeElement {
    pub fn new(key: &str, locator: Locator) -> Self {
        Self {
            key: key.to_string(),
            selectors: vec![locator.selector],
            route: None,
            parent: None,
            attached: true,
            displayed: true,
            enabled: true,
            disabled_attr: None,
            text: String::new(),
            value: String::new(),
            on_click: Vec::new(),
            click_errors: Vec::new(),
            inert_clicks: 0,
            hidden_lookups: 0,
        }
    }

    pub fn also(mut self, locator: Locator) -> Self {
        self.selectors.push(locator.selector);
        self
    }

    pub fn on(mut self, route: &str) -> Self {
        self.route = Some(route.to_string());
        self
    }

    pub fn inside(mut self, parent: &str) -> Self {
        self.parent = Some(parent.to_string());
        self
    }

    pub fn detached(mut self) -> Self {
        self.attached = false;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn value(mut self, value: &str) -> Self {
        self.value = value.to_string();
        self
    }

    pub fn disabled(mut self, attr: &str) -> Self {
        self.disabled_attr = Some(attr.to_string());
        self.enabled = false;
        self
    }

    pub fn on_click(mut self, effect: Effect) -> Self {
        self.on_click.push(effect);
        self
    }

    pub fn refuse_click(mut self, code: &str) -> Self {
        self.click_errors.push(code.to_string());
        self
    }

    pub fn inert_clicks(mut self, n: usize) -> Self {
        self.inert_clicks = n;
        self
    }

    pub fn appears_after(mut self, lookups: usize) -> Self {
        self.hidden_lookups = lookups;
        self
    }
}

#[derive(Debug)]
pub struct FakeDom {
    pub url: String,
    pub elements: Vec<FakeElement>,
    pub scripts: Vec<(String, Value)>,
    /// Every command received, e.g. `click:submit`, `find:<selector>`
    pub calls: Vec<String>,
    pub quits: usize,
}

impl Default for FakeDom {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeDom {
    pub fn new() -> Self {
        Self {
            url: "about:blank".to_string(),
            elements: Vec::new(),
            scripts: Vec::new(),
            calls: Vec::new(),
            quits: 0,
        }
    }

    pub fn add(&mut self, element: FakeElement) -> &mut Self {
        self.elements.push(element);
        self
    }

    pub fn script_returns(&mut self, script: &str, value: Value) -> &mut Self {
        self.scripts.push((script.to_string(), value));
        self
    }

    pub fn element(&self, key: &str) -> &FakeElement {
        self.elements
            .iter()
            .find(|e| e.key == key)
            .unwrap_or_else(|| panic!("no fake element '{}'", key))
    }

    /// Route part of the current URL.
    pub fn path(&self) -> String {
        match self.url.strip_prefix(BASE_URL) {
            Some("") => "/".to_string(),
            Some(rest) => rest.to_string(),
            None => self.url.clone(),
        }
    }

    pub fn set_attached(&mut self, key: &str, attached: bool) {
        self.set(key, |e| e.attached = attached);
    }

    /// Make clicks on `key` do nothing.
    pub fn clear_effects(&mut self, key: &str) {
        self.set(key, |e| e.on_click.clear());
    }

    pub fn calls_starting_with(&self, prefix: &str) -> Vec<&String> {
        self.calls.iter().filter(|c| c.starts_with(prefix)).collect()
    }

    fn live_index(&self, key: &str, command: &str) -> E2eResult<usize> {
        let path = self.path();
        self.elements
            .iter()
            .position(|e| e.key == key && e.attached && route_matches(e, &path))
            .ok_or_else(|| E2eError::WebDriver {
                command: command.to_string(),
                code: "stale element reference".to_string(),
                message: format!("{} is no longer attached", key),
            })
    }

    fn matching(&mut self, selector: &str, parent: Option<&str>) -> Vec<ElementRef> {
        let path = self.path();
        let mut found = Vec::new();
        for element in self.elements.iter_mut() {
            if !element.attached
                || !route_matches(element, &path)
                || !element.selectors.iter().any(|s| s == selector)
            {
                continue;
            }
            if let Some(parent) = parent {
                if element.parent.as_deref() != Some(parent) {
                    continue;
                }
            }
            if element.hidden_lookups > 0 {
                element.hidden_lookups -= 1;
                continue;
            }
            found.push(ElementRef(element.key.clone()));
        }
        found
    }

    fn trigger(&mut self, index: usize) {
        if self.elements[index].inert_clicks > 0 {
            self.elements[index].inert_clicks -= 1;
            return;
        }
        let effects = self.elements[index].on_click.clone();
        for effect in effects {
            self.apply(effect);
        }
    }

    fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::Navigate(route) => self.url = format!("{}{}", BASE_URL, route),
            Effect::Attach(key) => self.set(&key, |e| e.attached = true),
            Effect::Detach(key) => self.set(&key, |e| e.attached = false),
            Effect::SetValue(key, value) => self.set(&key, |e| e.value = value),
        }
    }

    fn set(&mut self, key: &str, change: impl FnOnce(&mut FakeElement)) {
        if let Some(element) = self.elements.iter_mut().find(|e| e.key == key) {
            change(element);
        }
    }
}

fn route_matches(element: &FakeElement, path: &str) -> bool {
    element.route.as_deref().is_none_or(|route| route == path)
}

fn element_arg(args: &[Value]) -> Option<String> {
    args.first()
        .and_then(ElementRef::from_json)
        .map(|e| e.0)
}

// ============================================================================
// Browser over the fake page
// ============================================================================

pub struct FakeBrowser {
    dom: Rc<RefCell<FakeDom>>,
}

impl FakeBrowser {
    pub fn new(dom: FakeDom) -> Self {
        Self {
            dom: Rc::new(RefCell::new(dom)),
        }
    }

    /// Shared handle for inspecting the page after the browser is moved.
    pub fn handle(&self) -> Rc<RefCell<FakeDom>> {
        Rc::clone(&self.dom)
    }

    pub fn dom(&self) -> std::cell::Ref<'_, FakeDom> {
        self.dom.borrow()
    }
}

impl Browser for FakeBrowser {
    fn navigate(&mut self, url: &str) -> E2eResult<()> {
        let mut dom = self.dom.borrow_mut();
        dom.calls.push(format!("navigate:{}", url));
        dom.url = url.to_string();
        Ok(())
    }

    fn current_url(&mut self) -> E2eResult<String> {
        Ok(self.dom.borrow().url.clone())
    }

    fn find_all(&mut self, locator: &Locator) -> E2eResult<Vec<ElementRef>> {
        let mut dom = self.dom.borrow_mut();
        dom.calls.push(format!("find:{}", locator.selector));
        Ok(dom.matching(&locator.selector, None))
    }

    fn find_all_within(&mut self, parent: &ElementRef, locator: &Locator) -> E2eResult<Vec<ElementRef>> {
        let mut dom = self.dom.borrow_mut();
        dom.calls.push(format!("find-within:{}:{}", parent.0, locator.selector));
        dom.live_index(&parent.0, "find elements from element")?;
        Ok(dom.matching(&locator.selector, Some(&parent.0)))
    }

    fn is_displayed(&mut self, element: &ElementRef) -> E2eResult<bool> {
        let dom = self.dom.borrow();
        let index = dom.live_index(&element.0, "is displayed")?;
        Ok(dom.elements[index].displayed)
    }

    fn is_enabled(&mut self, element: &ElementRef) -> E2eResult<bool> {
        let dom = self.dom.borrow();
        let index = dom.live_index(&element.0, "is enabled")?;
        Ok(dom.elements[index].enabled)
    }

    fn text(&mut self, element: &ElementRef) -> E2eResult<String> {
        let dom = self.dom.borrow();
        let index = dom.live_index(&element.0, "get text")?;
        Ok(dom.elements[index].text.clone())
    }

    fn attribute(&mut self, element: &ElementRef, name: &str) -> E2eResult<Option<String>> {
        let dom = self.dom.borrow();
        let index = dom.live_index(&element.0, "get attribute")?;
        Ok(match name {
            "disabled" => dom.elements[index].disabled_attr.clone(),
            _ => None,
        })
    }

    fn property(&mut self, element: &ElementRef, name: &str) -> E2eResult<Value> {
        let dom = self.dom.borrow();
        let index = dom.live_index(&element.0, "get property")?;
        Ok(match name {
            "value" => Value::String(dom.elements[index].value.clone()),
            _ => Value::Null,
        })
    }

    fn click(&mut self, element: &ElementRef) -> E2eResult<()> {
        let mut dom = self.dom.borrow_mut();
        dom.calls.push(format!("click:{}", element.0));
        let index = dom.live_index(&element.0, "element click")?;
        if !dom.elements[index].click_errors.is_empty() {
            let code = dom.elements[index].click_errors.remove(0);
            return Err(E2eError::from_wire(
                "element click",
                Some(element.0.as_str()),
                &code,
                "refused by fake page",
            ));
        }
        dom.trigger(index);
        Ok(())
    }

    fn clear(&mut self, element: &ElementRef) -> E2eResult<()> {
        let mut dom = self.dom.borrow_mut();
        dom.calls.push(format!("clear:{}", element.0));
        let index = dom.live_index(&element.0, "element clear")?;
        dom.elements[index].value.clear();
        Ok(())
    }

    fn send_keys(&mut self, element: &ElementRef, text: &str) -> E2eResult<()> {
        let mut dom = self.dom.borrow_mut();
        dom.calls.push(format!("keys:{}", element.0));
        let index = dom.live_index(&element.0, "element send keys")?;
        let value = &mut dom.elements[index].value;
        if text.contains(KEY_DELETE) {
            value.clear();
        } else if !text.contains(KEY_CONTROL) {
            value.push_str(text);
        }
        Ok(())
    }

    fn execute_script(&mut self, script: &str, args: Vec<Value>) -> E2eResult<Value> {
        let mut dom = self.dom.borrow_mut();
        let key = element_arg(&args).unwrap_or_default();

        if script == SCROLL_INTO_VIEW_SCRIPT {
            dom.calls.push(format!("scroll:{}", key));
            dom.live_index(&key, "execute script")?;
            return Ok(Value::Null);
        }
        if script == FORCED_CLICK_SCRIPT {
            dom.calls.push(format!("forced-click:{}", key));
            let index = dom.live_index(&key, "execute script")?;
            dom.trigger(index);
            return Ok(Value::Null);
        }
        if script == FORCED_SET_VALUE_SCRIPT {
            dom.calls.push(format!("forced-value:{}", key));
            let index = dom.live_index(&key, "execute script")?;
            let text = args.get(1).and_then(Value::as_str).unwrap_or_default().to_string();
            let replace = args.get(2).and_then(Value::as_bool).unwrap_or(false);
            let value = &mut dom.elements[index].value;
            if replace {
                *value = text;
            } else {
                value.push_str(&text);
            }
            return Ok(Value::Null);
        }

        dom.calls.push("script".to_string());
        Ok(dom
            .scripts
            .iter()
            .find(|(s, _)| s == script)
            .map(|(_, v)| v.clone())
            .unwrap_or(Value::Null))
    }

    fn set_window_size(&mut self, _width: u32, _height: u32) -> E2eResult<()> {
        Ok(())
    }

    fn quit(&mut self) -> E2eResult<()> {
        let mut dom = self.dom.borrow_mut();
        dom.calls.push("quit".to_string());
        dom.quits += 1;
        Ok(())
    }
}

// ============================================================================
// Session factories
// ============================================================================

/// Hands out browsers that all share one fake page.
pub struct FakeFactory {
    dom: Rc<RefCell<FakeDom>>,
}

impl FakeFactory {
    pub fn new(dom: FakeDom) -> Self {
        Self {
            dom: Rc::new(RefCell::new(dom)),
        }
    }

    pub fn dom(&self) -> std::cell::Ref<'_, FakeDom> {
        self.dom.borrow()
    }
}

impl SessionFactory for FakeFactory {
    fn open(&self) -> E2eResult<Box<dyn Browser>> {
        Ok(Box::new(FakeBrowser {
            dom: Rc::clone(&self.dom),
        }))
    }
}

/// A WebDriver server that never answers.
pub struct UnreachableFactory;

impl SessionFactory for UnreachableFactory {
    fn open(&self) -> E2eResult<Box<dyn Browser>> {
        Err(E2eError::Unreachable {
            what: "webdriver".to_string(),
            url: "http://localhost:4444".to_string(),
            reason: "connection refused".to_string(),
        })
    }
}
