//! End-to-end run: links → browser batch → spreadsheet.

use crate::browser::{BrowserSession, PageDriver};
use crate::config::ScrapeConfig;
use crate::controller::InteractionController;
use crate::error::Result;
use crate::export::{self, ExportReport};
use crate::extractor::Extractor;
use crate::links::{self, LinkBatch};
use crate::record::Outcome;
use crate::runner::BatchRunner;
use std::path::PathBuf;

/// Totals for a finished run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub export: Option<ExportReport>,
}

/// Everything a run needs once setup has succeeded
#[derive(Debug)]
pub struct Job {
    links: LinkBatch,
    extractor: Extractor,
    controller: InteractionController,
    output_path: PathBuf,
    sheet_name: String,
}

impl Job {
    /// Validate the config and load the links and extractor.
    ///
    /// Returns `Ok(None)` when the links file holds no usable URLs; the run
    /// then ends without launching a browser.
    pub fn prepare(config: &ScrapeConfig) -> Result<Option<Self>> {
        config.validate()?;

        let links = links::read_links(&config.links_path)?;
        if links.is_empty() {
            log::warn!("No links to process, nothing to do");
            return Ok(None);
        }

        let extractor = Extractor::from_file(&config.extractor_path, &config.extractor_entry)?;

        Ok(Some(Self {
            links,
            extractor,
            controller: InteractionController::from_config(config),
            output_path: config.output_path.clone(),
            sheet_name: config.sheet_name.clone(),
        }))
    }

    pub fn links(&self) -> &LinkBatch {
        &self.links
    }

    /// Scrape every link with `driver`
    pub fn execute<D: PageDriver + ?Sized>(&self, driver: &D) -> Vec<Outcome> {
        BatchRunner::new(&self.controller, &self.extractor).run(driver, &self.links)
    }

    /// Export the collected outcomes and summarize the run
    pub fn finish(&self, outcomes: &[Outcome]) -> Result<RunSummary> {
        let succeeded = outcomes.iter().filter(|o| o.is_success()).count();

        match serde_json::to_string_pretty(outcomes) {
            Ok(dump) => log::debug!("Collected outcomes:\n{}", dump),
            Err(e) => log::debug!("Could not serialize outcomes: {}", e),
        }

        let export = export::export(outcomes, &self.output_path, &self.sheet_name)?;

        Ok(RunSummary { total: outcomes.len(), succeeded, failed: outcomes.len() - succeeded, export })
    }
}

/// Open the browser the config asks for: attach to `wsEndpoint` if set, otherwise launch
pub fn open_session(config: &ScrapeConfig) -> Result<BrowserSession> {
    match config.connection_options() {
        Some(options) => BrowserSession::connect(options),
        None => BrowserSession::launch(config.launch_options()),
    }
}

/// Run a full scrape as configured.
///
/// Setup failures return before any browser starts. The browser lives only
/// for the batch and is shut down before the export, on every path.
pub fn run(config: &ScrapeConfig) -> Result<RunSummary> {
    let Some(job) = Job::prepare(config)? else {
        return Ok(RunSummary::default());
    };

    let outcomes = {
        let session = open_session(config)?;
        let outcomes = job.execute(&session);
        session.close();
        outcomes
    };

    job.finish(&outcomes)
}
