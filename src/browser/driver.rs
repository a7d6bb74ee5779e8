use serde_json::Value;

use crate::browser::protocol::{ElementRef, Locator};
use crate::error::E2eResult;

/// The operations scenarios need from a live browser.
///
/// `WebDriverSession` implements this over the W3C WebDriver protocol; tests
/// implement it over a scripted page. Methods take `&mut self` because a
/// session is a single ordered command stream.
pub trait Browser {
    fn navigate(&mut self, url: &str) -> E2eResult<()>;

    fn current_url(&mut self) -> E2eResult<String>;

    /// All elements matching `locator` in document order. Empty when nothing matches.
    fn find_all(&mut self, locator: &Locator) -> E2eResult<Vec<ElementRef>>;

    /// Descendants of `parent` matching `locator`.
    fn find_all_within(
        &mut self,
        parent: &ElementRef,
        locator: &Locator,
    ) -> E2eResult<Vec<ElementRef>>;

    fn is_displayed(&mut self, element: &ElementRef) -> E2eResult<bool>;

    fn is_enabled(&mut self, element: &ElementRef) -> E2eResult<bool>;

    fn text(&mut self, element: &ElementRef) -> E2eResult<String>;

    fn attribute(&mut self, element: &ElementRef, name: &str) -> E2eResult<Option<String>>;

    fn property(&mut self, element: &ElementRef, name: &str) -> E2eResult<Value>;

    /// Native click, subject to the browser's occlusion checks.
    fn click(&mut self, element: &ElementRef) -> E2eResult<()>;

    fn clear(&mut self, element: &ElementRef) -> E2eResult<()>;

    fn send_keys(&mut self, element: &ElementRef, text: &str) -> E2eResult<()>;

    /// Run a synchronous script; element arguments are passed via `ElementRef::to_json`.
    fn execute_script(&mut self, script: &str, args: Vec<Value>) -> E2eResult<Value>;

    fn set_window_size(&mut self, width: u32, height: u32) -> E2eResult<()>;

    /// End the session. Must be safe to call more than once.
    fn quit(&mut self) -> E2eResult<()>;

    /// First match, if any.
    fn find_first(&mut self, locator: &Locator) -> E2eResult<Option<ElementRef>> {
        Ok(self.find_all(locator)?.into_iter().next())
    }

    fn count(&mut self, locator: &Locator) -> E2eResult<usize> {
        Ok(self.find_all(locator)?.len())
    }

    /// Current value of a form control.
    fn value(&mut self, element: &ElementRef) -> E2eResult<String> {
        let value = self.property(element, "value")?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }
}
