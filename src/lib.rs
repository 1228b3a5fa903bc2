//! # product-scraper
//!
//! Headless-browser scraping of product pages into a spreadsheet.
//!
//! A run reads a list of product URLs and loads each one, in order, in a
//! single Chrome/Chromium tab. Sites that hide details behind a "show more"
//! control get an optional reveal click. A site-specific extractor script is
//! then evaluated in the page. Every page yields either a record or a failure
//! placeholder, and the results are written to an XLSX sheet with one row per
//! URL.
//!
//! ## Running a scrape
//!
//! ```bash
//! # links.txt: one URL per line; parser.js: defines getPageData()
//! cargo run -- scrape
//!
//! # Custom files and a visible browser
//! cargo run -- scrape --links shop.txt --extractor shop.js --output out/shop.xlsx --headed
//! ```
//!
//! ## Library usage
//!
//! ```rust,no_run
//! use product_scraper::{ScrapeConfig, pipeline};
//!
//! # fn main() -> product_scraper::Result<()> {
//! let config = ScrapeConfig::from_file("scrape.json")?;
//! let summary = pipeline::run(&config)?;
//! println!("{} of {} pages scraped", summary.succeeded, summary.total);
//! # Ok(())
//! # }
//! ```
//!
//! Driving the stages yourself, e.g. against an already running browser:
//!
//! ```rust,no_run
//! use product_scraper::{BatchRunner, BrowserSession, ConnectionOptions, Extractor, InteractionController, LinkBatch};
//! use std::time::Duration;
//!
//! # fn main() -> product_scraper::Result<()> {
//! let session = BrowserSession::connect(ConnectionOptions::new("ws://127.0.0.1:9222/devtools/browser/id"))?;
//! let links = LinkBatch::parse("https://shop.example.com/p/1\nhttps://shop.example.com/p/2");
//! let extractor = Extractor::from_file("parser.js", "getPageData")?;
//! let controller = InteractionController::new("h1", Duration::from_secs(30));
//!
//! let outcomes = BatchRunner::new(&controller, &extractor).run(&session, &links);
//! product_scraper::export::export(&outcomes, "products.xlsx", "Products")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! - [`browser`]: Browser session management and the [`PageDriver`] seam
//! - [`links`]: Reading the URL list
//! - [`extractor`]: The pluggable in-page extraction script
//! - [`controller`]: Per-page navigate / await / reveal / extract protocol
//! - [`runner`]: Sequential batch execution with per-link failure isolation
//! - [`record`]: Page records, failure records and flattening
//! - [`export`]: Column inference and XLSX output
//! - [`pipeline`]: The full run, from configuration to exported file
//! - [`config`]: Run configuration
//! - [`error`]: Error types and result aliases

pub mod browser;
pub mod config;
pub mod controller;
pub mod error;
pub mod export;
pub mod extractor;
pub mod links;
pub mod pipeline;
pub mod record;
pub mod runner;

pub use browser::{BrowserSession, ConnectionOptions, LaunchOptions, PageDriver};
pub use config::ScrapeConfig;
pub use controller::{InteractionController, RevealStep};
pub use error::{Result, ScrapeError};
pub use export::{ExportReport, Table};
pub use extractor::Extractor;
pub use links::LinkBatch;
pub use pipeline::RunSummary;
pub use record::{FailureRecord, FieldValue, FlatRow, Outcome, PageRecord};
pub use runner::BatchRunner;
