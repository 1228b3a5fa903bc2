use thiserror::Error;

/// Errors produced while preparing, running or exporting a scrape
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Links file, extractor file or configuration could not be used
    #[error("Configuration error: {0}")]
    Config(String),

    /// Chrome/Chromium could not be started
    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    /// Could not attach to a running browser over WebSocket
    #[error("Failed to connect to browser: {0}")]
    ConnectionFailed(String),

    #[error("Tab operation failed: {0}")]
    TabOperationFailed(String),

    /// Page did not load, or its readiness element never appeared
    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    /// The extractor script threw or could not be evaluated
    #[error("Script evaluation failed: {0}")]
    EvaluationFailed(String),

    /// The extractor returned something that is not a record
    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),

    /// The extractor returned null/undefined
    #[error("no data extracted")]
    NoData,

    #[error("Export failed: {0}")]
    ExportFailed(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, ScrapeError>;
