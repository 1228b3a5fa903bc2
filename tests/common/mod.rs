use product_scraper::{PageDriver, Result, ScrapeError};
use serde_json::{Value, json};
use std::cell::RefCell;
use std::collections::HashMap;
use std::time::Duration;

/// How a scripted URL behaves
pub enum Script {
    /// Page loads, shows an h1 and the extractor returns this value
    Extracts(Value),
    /// Page loads and needs a click on `trigger` before `value` is extractable
    ExtractsAfterReveal { trigger: &'static str, content: &'static str, value: Value },
    /// Navigation times out
    TimesOut,
}

/// A browser stand-in that follows a per-URL script
pub struct ScriptedDriver {
    scripts: HashMap<String, Script>,
    current: RefCell<Option<String>>,
    revealed: RefCell<bool>,
    pub visited: RefCell<Vec<String>>,
}

impl ScriptedDriver {
    pub fn new(scripts: Vec<(&str, Script)>) -> Self {
        Self {
            scripts: scripts.into_iter().map(|(u, s)| (u.to_string(), s)).collect(),
            current: RefCell::new(None),
            revealed: RefCell::new(false),
            visited: RefCell::new(Vec::new()),
        }
    }

    fn script(&self) -> Result<&Script> {
        let current = self.current.borrow();
        let url = current.as_ref().ok_or_else(|| ScrapeError::TabOperationFailed("no page".into()))?;
        self.scripts.get(url).ok_or_else(|| ScrapeError::TabOperationFailed(format!("unscripted {}", url)))
    }
}

impl PageDriver for ScriptedDriver {
    fn navigate(&self, url: &str) -> Result<()> {
        self.visited.borrow_mut().push(url.to_string());
        *self.revealed.borrow_mut() = false;
        match self.scripts.get(url) {
            Some(Script::TimesOut) | None => {
                Err(ScrapeError::NavigationFailed(format!("Navigation to {} did not complete: timed out after 30s", url)))
            }
            Some(_) => {
                *self.current.borrow_mut() = Some(url.to_string());
                Ok(())
            }
        }
    }

    fn wait_for_element(&self, selector: &str, timeout: Duration) -> Result<()> {
        let found = match self.script()? {
            Script::Extracts(_) => selector == "h1",
            Script::ExtractsAfterReveal { trigger, content, .. } => {
                selector == "h1" || selector == *trigger || (selector == *content && *self.revealed.borrow())
            }
            Script::TimesOut => false,
        };
        if found { Ok(()) } else { Err(ScrapeError::Timeout(format!("'{}' after {:?}", selector, timeout))) }
    }

    fn click(&self, selector: &str) -> Result<()> {
        match self.script()? {
            Script::ExtractsAfterReveal { trigger, .. } if selector == *trigger => {
                *self.revealed.borrow_mut() = true;
                Ok(())
            }
            _ => Err(ScrapeError::ElementNotFound(selector.to_string())),
        }
    }

    fn evaluate(&self, _expression: &str) -> Result<Option<Value>> {
        let data = match self.script()? {
            Script::Extracts(value) => value.clone(),
            Script::ExtractsAfterReveal { value, .. } if *self.revealed.borrow() => value.clone(),
            _ => Value::Null,
        };
        Ok(Some(Value::String(json!({ "data": data }).to_string())))
    }
}
