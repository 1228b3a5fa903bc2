use crate::{browser::config::{ConnectionOptions, LaunchOptions},
            browser::driver::PageDriver,
            error::{Result, ScrapeError}};
use headless_chrome::{Browser, Tab};
use serde_json::Value;
use std::{ffi::OsStr, sync::Arc, time::Duration};

/// Browser session that owns one Chrome/Chromium instance and the tab the scrape runs in.
///
/// The browser process is shut down when the session is dropped, so holding the
/// session in a scope guarantees cleanup on every exit path.
pub struct BrowserSession {
    /// The underlying headless_chrome Browser instance
    browser: Browser,

    /// The tab every page of the batch is loaded into
    tab: Arc<Tab>,
}

impl BrowserSession {
    /// Launch a new browser instance with the given options
    pub fn launch(options: LaunchOptions) -> Result<Self> {
        let mut launch_opts = headless_chrome::LaunchOptions::default();

        // Ignore default arguments to prevent detection by anti-bot services
        launch_opts.ignore_default_args.push(OsStr::new("--enable-automation"));
        launch_opts.args.push(OsStr::new("--disable-blink-features=AutomationControlled"));

        // Long batches sit idle between CDP events while pages render; keep the browser alive for an hour
        launch_opts.idle_browser_timeout = Duration::from_secs(60 * 60);

        launch_opts.headless = options.headless;
        launch_opts.window_size = Some((options.window_width, options.window_height));

        if let Some(path) = options.chrome_path {
            launch_opts.path = Some(path);
        }

        if let Some(dir) = options.user_data_dir {
            launch_opts.user_data_dir = Some(dir);
        }

        launch_opts.sandbox = options.sandbox;

        log::info!("Launching browser (headless: {})", options.headless);
        let browser = Browser::new(launch_opts).map_err(|e| ScrapeError::LaunchFailed(e.to_string()))?;

        let tab = browser
            .new_tab()
            .map_err(|e| ScrapeError::LaunchFailed(format!("Failed to create tab: {}", e)))?;
        tab.set_default_timeout(options.default_timeout);

        Ok(Self { browser, tab })
    }

    /// Connect to an existing browser instance via WebSocket
    pub fn connect(options: ConnectionOptions) -> Result<Self> {
        log::info!("Connecting to browser at {}", options.ws_url);
        let browser =
            Browser::connect(options.ws_url.clone()).map_err(|e| ScrapeError::ConnectionFailed(e.to_string()))?;

        let tab = browser
            .new_tab()
            .map_err(|e| ScrapeError::TabOperationFailed(format!("Failed to create tab: {}", e)))?;
        tab.set_default_timeout(Duration::from_millis(options.timeout));

        Ok(Self { browser, tab })
    }

    /// The tab the session drives
    pub fn tab(&self) -> &Arc<Tab> {
        &self.tab
    }

    /// Get the underlying Browser instance
    pub fn browser(&self) -> &Browser {
        &self.browser
    }

    /// Close the session's tab and shut the browser down
    pub fn close(self) {
        log::info!("Closing browser");
        if let Err(e) = self.tab.close(false) {
            log::debug!("Failed to close tab cleanly: {}", e);
        }
        // Dropping `self` drops the Browser, which terminates the child process
    }
}

impl PageDriver for BrowserSession {
    /// `wait_until_navigated` returns once the frame stops loading, so this can outlast DOM parsing.
    /// Callers treat the ready-selector wait that follows as the real readiness signal.
    fn navigate(&self, url: &str) -> Result<()> {
        self.tab
            .navigate_to(url)
            .map_err(|e| ScrapeError::NavigationFailed(format!("Failed to navigate to {}: {}", url, e)))?;

        self.tab
            .wait_until_navigated()
            .map_err(|e| ScrapeError::NavigationFailed(format!("Navigation to {} did not complete: {}", url, e)))?;

        Ok(())
    }

    fn wait_for_element(&self, selector: &str, timeout: Duration) -> Result<()> {
        self.tab.wait_for_element_with_custom_timeout(selector, timeout).map_err(|e| {
            ScrapeError::Timeout(format!("element '{}' did not appear within {:?}: {}", selector, timeout, e))
        })?;

        Ok(())
    }

    fn click(&self, selector: &str) -> Result<()> {
        let element = self
            .tab
            .find_element(selector)
            .map_err(|e| ScrapeError::ElementNotFound(format!("Element '{}' not found: {}", selector, e)))?;

        element
            .click()
            .map_err(|e| ScrapeError::TabOperationFailed(format!("Failed to click '{}': {}", selector, e)))?;

        Ok(())
    }

    fn evaluate(&self, expression: &str) -> Result<Option<Value>> {
        let result = self
            .tab
            .evaluate(expression, true)
            .map_err(|e| ScrapeError::EvaluationFailed(e.to_string()))?;

        Ok(result.value)
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        log::debug!("Browser session released");
    }
}
