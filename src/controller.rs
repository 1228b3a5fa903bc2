//! Per-page interaction protocol: navigate, await readiness, optionally reveal, extract.

use crate::browser::PageDriver;
use crate::config::ScrapeConfig;
use crate::error::{Result, ScrapeError};
use crate::extractor::Extractor;
use crate::record::PageRecord;
use std::time::Duration;

/// Click-to-expand step for sites that hide part of the product content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealStep {
    pub trigger_selector: String,
    pub content_selector: String,
    /// How long to look for the trigger before assuming the content is already complete
    pub trigger_timeout: Duration,
    pub content_timeout: Duration,
}

/// Drives one page through the interaction protocol
#[derive(Debug, Clone)]
pub struct InteractionController {
    ready_selector: String,
    ready_timeout: Duration,
    reveal: Option<RevealStep>,
}

impl InteractionController {
    pub fn new(ready_selector: impl Into<String>, ready_timeout: Duration) -> Self {
        Self { ready_selector: ready_selector.into(), ready_timeout, reveal: None }
    }

    /// Builder method: attempt this reveal step on every page
    pub fn with_reveal(mut self, step: RevealStep) -> Self {
        self.reveal = Some(step);
        self
    }

    pub fn from_config(config: &ScrapeConfig) -> Self {
        let controller = Self::new(config.ready_selector.clone(), config.ready_timeout());

        if config.content_is_complete {
            return controller;
        }

        let selector = |s: &Option<String>| s.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(String::from);
        match (selector(&config.reveal.trigger_selector), selector(&config.reveal.content_selector)) {
            (Some(trigger_selector), Some(content_selector)) => controller.with_reveal(RevealStep {
                trigger_selector,
                content_selector,
                trigger_timeout: Duration::from_millis(config.reveal.trigger_timeout_ms),
                content_timeout: Duration::from_millis(config.reveal.content_timeout_ms),
            }),
            _ => {
                log::warn!("contentIsComplete is false but no reveal selectors are configured; skipping reveal step");
                controller
            }
        }
    }

    pub fn reveal_step(&self) -> Option<&RevealStep> {
        self.reveal.as_ref()
    }

    /// Load `url` and extract its record.
    ///
    /// Navigation and readiness failures, extractor errors and an extractor
    /// returning null all surface as `Err`; the reveal step never does.
    pub fn process<D: PageDriver + ?Sized>(&self, driver: &D, url: &str, extractor: &Extractor) -> Result<PageRecord> {
        log::info!("Navigating to {}", url);
        driver.navigate(url)?;

        driver.wait_for_element(&self.ready_selector, self.ready_timeout).map_err(|e| {
            ScrapeError::NavigationFailed(format!("page {} never showed '{}': {}", url, self.ready_selector, e))
        })?;

        if let Some(step) = &self.reveal {
            self.reveal(driver, step);
        }

        let record = extractor.extract(driver, url)?;
        log::info!("Collected {} fields from {}", record.len(), url);
        Ok(record)
    }

    /// Best-effort reveal: returns whether expanded content appeared. Errors are logged, never returned.
    pub fn reveal<D: PageDriver + ?Sized>(&self, driver: &D, step: &RevealStep) -> bool {
        log::debug!("Waiting for reveal control '{}'", step.trigger_selector);
        if let Err(e) = driver.wait_for_element(&step.trigger_selector, step.trigger_timeout) {
            log::info!("Reveal control not found, treating content as complete");
            log::debug!("{}", e);
            return false;
        }

        if let Err(e) = driver.click(&step.trigger_selector) {
            log::warn!("Failed to click reveal control '{}': {}", step.trigger_selector, e);
            return false;
        }

        log::debug!("Waiting for revealed content '{}'", step.content_selector);
        if let Err(e) = driver.wait_for_element(&step.content_selector, step.content_timeout) {
            log::warn!("Revealed content '{}' did not appear: {}", step.content_selector, e);
            return false;
        }

        true
    }
}
