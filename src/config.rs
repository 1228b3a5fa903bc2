use crate::browser::{ConnectionOptions, LaunchOptions};
use crate::error::{Result, ScrapeError};
use crate::export;
use crate::extractor::DEFAULT_ENTRY;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Run configuration, loadable from a JSON file with camelCase keys.
/// Every key is optional; missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScrapeConfig {
    /// Destination spreadsheet
    pub output_path: PathBuf,

    /// Site-specific extractor script
    pub extractor_path: PathBuf,

    /// Newline-delimited URL list
    pub links_path: PathBuf,

    /// Skip the reveal step; set when product pages render their full content up front
    pub content_is_complete: bool,

    /// Name of the exported worksheet
    pub sheet_name: String,

    /// Function the extractor script defines and the controller calls
    pub extractor_entry: String,

    /// Element whose presence means the page has loaded enough to work with
    pub ready_selector: String,

    pub ready_timeout_ms: u64,

    pub navigation_timeout_ms: u64,

    pub reveal: RevealConfig,

    pub browser: BrowserConfig,
}

/// The "show more" interaction some sites need before extraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RevealConfig {
    /// Control to click (e.g. a "Details" button)
    pub trigger_selector: Option<String>,

    /// Element that appears once the content is revealed
    pub content_selector: Option<String>,

    pub trigger_timeout_ms: u64,

    pub content_timeout_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BrowserConfig {
    pub headless: bool,
    pub window_width: u32,
    pub window_height: u32,
    pub chrome_path: Option<PathBuf>,
    pub user_data_dir: Option<PathBuf>,
    pub sandbox: bool,

    /// Attach to a running browser instead of launching one
    pub ws_endpoint: Option<String>,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from("products.xlsx"),
            extractor_path: PathBuf::from("parser.js"),
            links_path: PathBuf::from("links.txt"),
            content_is_complete: false,
            sheet_name: "Products".to_string(),
            extractor_entry: DEFAULT_ENTRY.to_string(),
            ready_selector: "h1".to_string(),
            ready_timeout_ms: 30_000,
            navigation_timeout_ms: 30_000,
            reveal: RevealConfig::default(),
            browser: BrowserConfig::default(),
        }
    }
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self { trigger_selector: None, content_selector: None, trigger_timeout_ms: 5_000, content_timeout_ms: 30_000 }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        let launch = LaunchOptions::default();
        Self {
            headless: launch.headless,
            window_width: launch.window_width,
            window_height: launch.window_height,
            chrome_path: None,
            user_data_dir: None,
            sandbox: launch.sandbox,
            ws_endpoint: None,
        }
    }
}

impl ScrapeConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ScrapeError::Config(format!("Failed to read config {}: {}", path.display(), e)))?;

        Self::from_json_str(&contents).map_err(|e| match e {
            ScrapeError::Config(msg) => ScrapeError::Config(format!("{}: {}", path.display(), msg)),
            other => other,
        })
    }

    /// Load configuration from a JSON string
    pub fn from_json_str(contents: &str) -> Result<Self> {
        serde_json::from_str(contents).map_err(|e| ScrapeError::Config(format!("Invalid config: {}", e)))
    }

    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        for (name, path) in
            [("outputPath", &self.output_path), ("extractorPath", &self.extractor_path), ("linksPath", &self.links_path)]
        {
            if path.as_os_str().is_empty() {
                return Err(ScrapeError::Config(format!("{} must not be empty", name)));
            }
        }

        export::check_sheet_name(&self.sheet_name)
            .map_err(|e| ScrapeError::Config(format!("sheetName '{}' {}", self.sheet_name, e)))?;

        if self.extractor_entry.trim().is_empty() {
            return Err(ScrapeError::Config("extractorEntry must not be empty".to_string()));
        }
        if self.ready_selector.trim().is_empty() {
            return Err(ScrapeError::Config("readySelector must not be empty".to_string()));
        }

        for (name, value) in [
            ("readyTimeoutMs", self.ready_timeout_ms),
            ("navigationTimeoutMs", self.navigation_timeout_ms),
            ("reveal.triggerTimeoutMs", self.reveal.trigger_timeout_ms),
            ("reveal.contentTimeoutMs", self.reveal.content_timeout_ms),
        ] {
            if value == 0 {
                return Err(ScrapeError::Config(format!("{} must be greater than zero", name)));
            }
        }

        let trigger = self.reveal.trigger_selector.as_deref().filter(|s| !s.trim().is_empty());
        let content = self.reveal.content_selector.as_deref().filter(|s| !s.trim().is_empty());
        if trigger.is_some() != content.is_some() {
            return Err(ScrapeError::Config(
                "reveal.triggerSelector and reveal.contentSelector must be set together".to_string(),
            ));
        }

        Ok(())
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_millis(self.ready_timeout_ms)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    /// Browser launch options derived from this configuration
    pub fn launch_options(&self) -> LaunchOptions {
        let mut opts = LaunchOptions::new()
            .headless(self.browser.headless)
            .window_size(self.browser.window_width, self.browser.window_height)
            .sandbox(self.browser.sandbox)
            .default_timeout(self.navigation_timeout());

        if let Some(path) = &self.browser.chrome_path {
            opts = opts.chrome_path(path.clone());
        }
        if let Some(dir) = &self.browser.user_data_dir {
            opts = opts.user_data_dir(dir.clone());
        }

        opts
    }

    /// Connection options when attaching to a running browser
    pub fn connection_options(&self) -> Option<ConnectionOptions> {
        self.browser
            .ws_endpoint
            .as_ref()
            .map(|ws| ConnectionOptions::new(ws.clone()).timeout(self.navigation_timeout_ms))
    }
}
