//! Site-specific extraction logic, loaded as a script and evaluated inside the page.

use crate::browser::PageDriver;
use crate::error::{Result, ScrapeError};
use crate::record::PageRecord;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Default name of the function an extractor script must define
pub const DEFAULT_ENTRY: &str = "getPageData";

/// A swappable, in-page extraction strategy.
///
/// The script defines an entry function that reads the rendered DOM and returns
/// a record object, `null`, or a promise of either. It must not mutate the page.
#[derive(Debug, Clone)]
pub struct Extractor {
    source: String,
    entry: String,
    origin: Option<PathBuf>,
}

/// What the in-page wrapper reports back
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    data: Value,
    #[serde(default)]
    error: Option<String>,
}

impl Extractor {
    pub fn new(source: impl Into<String>, entry: impl Into<String>) -> Self {
        Self { source: source.into(), entry: entry.into(), origin: None }
    }

    /// Load the extractor script at `path`
    pub fn from_file(path: impl AsRef<Path>, entry: &str) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| ScrapeError::Config(format!("Failed to read extractor {}: {}", path.display(), e)))?;

        if source.trim().is_empty() {
            return Err(ScrapeError::Config(format!("Extractor {} is empty", path.display())));
        }

        log::info!("Using extractor {} (entry: {})", path.display(), entry);
        Ok(Self { source, entry: entry.to_string(), origin: Some(path.to_path_buf()) })
    }

    pub fn entry(&self) -> &str {
        &self.entry
    }

    /// Where the script was loaded from, if it came from a file
    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }

    /// The expression evaluated in the page.
    ///
    /// Script errors and results are folded into one JSON envelope string so
    /// the caller always gets a primitive back, whatever the extractor returns.
    pub fn expression(&self) -> String {
        format!(
            r#"(async () => {{
  try {{
{source}
;
    const __data = await {entry}();
    return JSON.stringify({{ data: __data === undefined ? null : __data }});
  }} catch (e) {{
    return JSON.stringify({{ error: String((e && e.message) || e) }});
  }}
}})()"#,
            source = self.source,
            entry = self.entry
        )
    }

    /// Run the extractor against the page currently loaded in `driver`
    pub fn extract<D: PageDriver + ?Sized>(&self, driver: &D, url: &str) -> Result<PageRecord> {
        let value = driver.evaluate(&self.expression())?;
        let data = Self::unwrap_result(value)?;
        PageRecord::from_json(data, url)
    }

    /// Decode the evaluation result: an envelope string, or a raw value from drivers that return objects directly
    fn unwrap_result(value: Option<Value>) -> Result<Value> {
        let envelope: Envelope = match value {
            None | Some(Value::Null) => return Err(ScrapeError::NoData),
            Some(Value::String(json)) => serde_json::from_str(&json)
                .map_err(|e| ScrapeError::ExtractionFailed(format!("Failed to parse extractor result: {}", e)))?,
            Some(other) => serde_json::from_value(other)
                .map_err(|e| ScrapeError::ExtractionFailed(format!("Unexpected extractor result: {}", e)))?,
        };

        if let Some(error) = envelope.error {
            return Err(ScrapeError::EvaluationFailed(error));
        }

        match envelope.data {
            Value::Null => Err(ScrapeError::NoData),
            data => Ok(data),
        }
    }
}
