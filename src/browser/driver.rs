use crate::error::Result;
use serde_json::Value;
use std::time::Duration;

/// The browser capabilities the scraping pipeline consumes.
///
/// Every call acts on the single page the driver currently controls.
/// [`BrowserSession`](crate::browser::BrowserSession) implements this over
/// Chrome DevTools; tests substitute scripted fakes.
pub trait PageDriver {
    /// Load `url` and block until the frame has navigated (DOM parsed)
    fn navigate(&self, url: &str) -> Result<()>;

    /// Block until an element matching `selector` exists, or fail after `timeout`
    fn wait_for_element(&self, selector: &str, timeout: Duration) -> Result<()>;

    /// Click the first element matching `selector`
    fn click(&self, selector: &str) -> Result<()>;

    /// Evaluate a JavaScript expression in the page, awaiting it if it is a promise.
    /// Returns the primitive result value, or `None` for `undefined`/non-primitive results.
    fn evaluate(&self, expression: &str) -> Result<Option<Value>>;
}

impl<D: PageDriver + ?Sized> PageDriver for &D {
    fn navigate(&self, url: &str) -> Result<()> {
        (**self).navigate(url)
    }

    fn wait_for_element(&self, selector: &str, timeout: Duration) -> Result<()> {
        (**self).wait_for_element(selector, timeout)
    }

    fn click(&self, selector: &str) -> Result<()> {
        (**self).click(selector)
    }

    fn evaluate(&self, expression: &str) -> Result<Option<Value>> {
        (**self).evaluate(expression)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory driver used by unit tests.

    use super::PageDriver;
    use crate::error::{Result, ScrapeError};
    use serde_json::{Value, json};
    use std::cell::RefCell;
    use std::collections::{HashMap, HashSet};
    use std::time::Duration;

    /// A fake page: which selectors exist and what extraction yields
    #[derive(Debug, Clone, Default)]
    pub struct FakePage {
        pub navigation_error: Option<String>,
        pub elements: HashSet<String>,
        /// (trigger, revealed content) pair; clicking the trigger makes the content appear
        pub reveal: Option<(String, String)>,
        pub click_fails: bool,
        /// Extractor result before and after the reveal click
        pub extracted: Option<Value>,
        pub extracted_after_reveal: Option<Value>,
        pub evaluation_error: Option<String>,
    }

    impl FakePage {
        pub fn with_heading(extracted: Option<Value>) -> Self {
            Self {
                elements: HashSet::from(["h1".to_string()]),
                extracted,
                ..Default::default()
            }
        }
    }

    #[derive(Default)]
    pub struct FakeDriver {
        pages: HashMap<String, FakePage>,
        current: RefCell<Option<String>>,
        revealed: RefCell<HashSet<String>>,
        pub calls: RefCell<Vec<String>>,
    }

    impl FakeDriver {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn page(mut self, url: &str, page: FakePage) -> Self {
            self.pages.insert(url.to_string(), page);
            self
        }

        fn current_page(&self) -> Result<(String, FakePage)> {
            let current = self.current.borrow().clone();
            current
                .and_then(|url| self.pages.get(&url).cloned().map(|p| (url, p)))
                .ok_or_else(|| ScrapeError::TabOperationFailed("no page loaded".to_string()))
        }
    }

    impl PageDriver for FakeDriver {
        fn navigate(&self, url: &str) -> Result<()> {
            self.calls.borrow_mut().push(format!("navigate {}", url));
            let page = self
                .pages
                .get(url)
                .ok_or_else(|| ScrapeError::NavigationFailed(format!("net::ERR_NAME_NOT_RESOLVED at {}", url)))?;
            if let Some(err) = &page.navigation_error {
                return Err(ScrapeError::NavigationFailed(err.clone()));
            }
            *self.current.borrow_mut() = Some(url.to_string());
            Ok(())
        }

        fn wait_for_element(&self, selector: &str, _timeout: Duration) -> Result<()> {
            self.calls.borrow_mut().push(format!("wait {}", selector));
            let (url, page) = self.current_page()?;
            let revealed = page
                .reveal
                .as_ref()
                .is_some_and(|(_, content)| content == selector && self.revealed.borrow().contains(&url));
            let trigger = page.reveal.as_ref().is_some_and(|(trigger, _)| trigger == selector);
            if page.elements.contains(selector) || revealed || trigger {
                Ok(())
            } else {
                Err(ScrapeError::Timeout(format!("element '{}' did not appear", selector)))
            }
        }

        fn click(&self, selector: &str) -> Result<()> {
            self.calls.borrow_mut().push(format!("click {}", selector));
            let (url, page) = self.current_page()?;
            if page.click_fails {
                return Err(ScrapeError::ElementNotFound(format!("'{}' is not clickable", selector)));
            }
            match &page.reveal {
                Some((trigger, _)) if trigger == selector => {
                    self.revealed.borrow_mut().insert(url);
                    Ok(())
                }
                _ => Err(ScrapeError::ElementNotFound(selector.to_string())),
            }
        }

        fn evaluate(&self, _expression: &str) -> Result<Option<Value>> {
            self.calls.borrow_mut().push("evaluate".to_string());
            let (url, page) = self.current_page()?;
            // Mirror the in-page wrapper: everything comes back as a JSON envelope string
            let envelope = if let Some(err) = page.evaluation_error {
                json!({ "error": err })
            } else if self.revealed.borrow().contains(&url) && page.extracted_after_reveal.is_some() {
                json!({ "data": page.extracted_after_reveal })
            } else {
                json!({ "data": page.extracted })
            };
            Ok(Some(Value::String(envelope.to_string())))
        }
    }
}
