//! product-scraper CLI
//!
//! Scrapes the product pages listed in a links file with a headless browser and
//! writes the extracted records to an XLSX spreadsheet.

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use product_scraper::{ScrapeConfig, pipeline};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "product-scraper")]
#[command(version)]
#[command(about = "Scrape product pages with a headless browser and export them to XLSX", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Read the links file, scrape every page and write the spreadsheet
    Scrape(ScrapeArgs),
}

#[derive(clap::Args)]
struct ScrapeArgs {
    /// JSON configuration file (camelCase keys, all optional)
    #[arg(long, short = 'c', value_name = "FILE")]
    config: Option<PathBuf>,

    /// Newline-delimited list of product URLs
    #[arg(long, short = 'l', value_name = "FILE")]
    links: Option<PathBuf>,

    /// Extractor script defining the entry function
    #[arg(long, short = 'e', value_name = "FILE")]
    extractor: Option<PathBuf>,

    /// Destination spreadsheet
    #[arg(long, short = 'o', value_name = "FILE")]
    output: Option<PathBuf>,

    /// Skip the reveal click; pages already render their full content
    #[arg(long)]
    content_complete: bool,

    /// Launch browser in headed mode (default: headless)
    #[arg(long, short = 'H')]
    headed: bool,

    /// Path to custom browser executable
    #[arg(long, value_name = "PATH")]
    chrome_path: Option<PathBuf>,

    /// WebSocket endpoint of an already running browser
    #[arg(long, value_name = "URL")]
    ws_endpoint: Option<String>,
}

impl ScrapeArgs {
    /// Load the config file if given, then apply flag overrides
    fn into_config(self) -> anyhow::Result<ScrapeConfig> {
        let mut config = match &self.config {
            Some(path) => ScrapeConfig::from_file(path)?,
            None => ScrapeConfig::default(),
        };

        if let Some(links) = self.links {
            config.links_path = links;
        }
        if let Some(extractor) = self.extractor {
            config.extractor_path = extractor;
        }
        if let Some(output) = self.output {
            config.output_path = output;
        }
        if self.content_complete {
            config.content_is_complete = true;
        }
        if self.headed {
            config.browser.headless = false;
        }
        if let Some(path) = self.chrome_path {
            config.browser.chrome_path = Some(path);
        }
        if let Some(ws) = self.ws_endpoint {
            config.browser.ws_endpoint = Some(ws);
        }

        Ok(config)
    }
}

fn scrape(args: ScrapeArgs) -> anyhow::Result<()> {
    let config = args.into_config().context("Failed to load configuration")?;

    log::info!("Starting scrape (links: {}, extractor: {})", config.links_path.display(), config.extractor_path.display());

    let summary = pipeline::run(&config).context("Scrape aborted")?;

    match &summary.export {
        Some(report) => log::info!(
            "Done: {} pages, {} succeeded, {} failed; wrote {}",
            summary.total,
            summary.succeeded,
            summary.failed,
            report.path.display()
        ),
        None => log::info!("Done: nothing was scraped"),
    }

    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let Some(command) = cli.command else {
        eprintln!("No command given. Use `product-scraper scrape` to start scraping.\n");
        let _ = Cli::command().print_help();
        return ExitCode::SUCCESS;
    };

    match command {
        Command::Scrape(args) => match scrape(args) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                log::error!("{:#}", e);
                ExitCode::FAILURE
            }
        },
    }
}
