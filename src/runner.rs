//! Sequential batch execution with per-link failure isolation.

use crate::browser::PageDriver;
use crate::controller::InteractionController;
use crate::extractor::Extractor;
use crate::links::LinkBatch;
use crate::record::Outcome;

/// Runs every link of a batch through the controller against one driver
pub struct BatchRunner<'a> {
    controller: &'a InteractionController,
    extractor: &'a Extractor,
}

impl<'a> BatchRunner<'a> {
    pub fn new(controller: &'a InteractionController, extractor: &'a Extractor) -> Self {
        Self { controller, extractor }
    }

    /// Process `links` strictly in order, one at a time.
    ///
    /// Returns exactly one outcome per link, in input order. A failing link
    /// becomes a failure record and never stops the links after it.
    pub fn run<D: PageDriver + ?Sized>(&self, driver: &D, links: &LinkBatch) -> Vec<Outcome> {
        let total = links.len();
        let mut outcomes = Vec::with_capacity(total);

        for (i, url) in links.iter().enumerate() {
            log::info!("[{}/{}] Processing {}", i + 1, total, url);

            let outcome = match self.controller.process(driver, url, self.extractor) {
                Ok(record) => {
                    log::info!("[{}/{}] Data for {} collected", i + 1, total, url);
                    Outcome::Page(record)
                }
                Err(e) => {
                    log::warn!("[{}/{}] Failed to process {}: {}", i + 1, total, url, e);
                    Outcome::failed(url, e.to_string())
                }
            };
            outcomes.push(outcome);
        }

        let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
        log::info!("Batch finished: {} succeeded, {} failed", succeeded, total - succeeded);

        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::driver::testing::{FakeDriver, FakePage};
    use crate::extractor::DEFAULT_ENTRY;
    use crate::record::FailureRecord;
    use serde_json::json;
    use std::time::Duration;

    fn run(driver: &FakeDriver, text: &str) -> Vec<Outcome> {
        let controller = InteractionController::new("h1", Duration::from_millis(10));
        let extractor = Extractor::new("function getPageData() {}", DEFAULT_ENTRY);
        BatchRunner::new(&controller, &extractor).run(driver, &LinkBatch::parse(text))
    }

    #[test]
    fn test_one_outcome_per_link_in_order() {
        let driver = FakeDriver::new()
            .page("http://site/a", FakePage::with_heading(Some(json!({"n": "a"}))))
            .page("http://site/b", FakePage::with_heading(Some(json!({"n": "b"}))))
            .page("http://site/c", FakePage::with_heading(Some(json!({"n": "c"}))));

        let outcomes = run(&driver, "http://site/c\nhttp://site/a\nhttp://site/b\nhttp://site/a");
        let urls: Vec<_> = outcomes.iter().filter_map(Outcome::url).collect();
        assert_eq!(urls, vec!["http://site/c", "http://site/a", "http://site/b", "http://site/a"]);
        assert!(outcomes.iter().all(Outcome::is_success));
    }

    #[test]
    fn test_failures_are_isolated() {
        let timeout = FakePage { navigation_error: Some("Navigation timeout".to_string()), ..Default::default() };
        let driver = FakeDriver::new()
            .page("http://site/p1", FakePage::with_heading(None))
            .page("http://site/p2", timeout)
            .page("http://site/p3", FakePage::with_heading(Some(json!({"price": "30"}))));

        let outcomes = run(&driver, "http://site/p1\nhttp://site/p2\nhttp://site/p3\nhttp://site/unknown");
        assert_eq!(outcomes.len(), 4);

        assert_eq!(
            outcomes[0],
            Outcome::Failed(FailureRecord { url: "http://site/p1".into(), error: "no data extracted".into() })
        );
        match &outcomes[1] {
            Outcome::Failed(f) => {
                assert_eq!(f.url, "http://site/p2");
                assert!(f.error.contains("Navigation timeout"));
            }
            other => panic!("Expected failure, got {:?}", other),
        }
        assert!(outcomes[2].is_success());
        match &outcomes[3] {
            Outcome::Failed(f) => assert!(!f.error.is_empty()),
            other => panic!("Expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_batch() {
        let driver = FakeDriver::new();
        assert!(run(&driver, "").is_empty());
        assert!(driver.calls.borrow().is_empty());
    }
}
