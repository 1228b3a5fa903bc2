//! Reading the list of product URLs to scrape.

use crate::error::{Result, ScrapeError};
use std::path::Path;
use url::Url;

/// Ordered, immutable list of absolute HTTP(S) URLs; order defines output row order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkBatch {
    links: Vec<String>,
}

impl LinkBatch {
    /// Parse newline-delimited text, keeping only well-formed absolute HTTP(S) URLs
    pub fn parse(text: &str) -> Self {
        let links = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .filter(|line| {
                let keep = is_http_url(line);
                if !keep {
                    log::debug!("Skipping line that is not an http(s) URL: {}", line);
                }
                keep
            })
            .map(String::from)
            .collect();

        Self { links }
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &str> {
        self.links.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.links
    }
}

/// Whether a trimmed line is an absolute http:// or https:// URL with a host
pub fn is_http_url(line: &str) -> bool {
    let lower = line.get(..8).unwrap_or(line).to_ascii_lowercase();
    if !(lower.starts_with("http://") || lower.starts_with("https://")) {
        return false;
    }

    match Url::parse(line) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host_str().is_some_and(|h| !h.is_empty()),
        Err(_) => false,
    }
}

/// Read the links file at `path`.
///
/// An unreadable file is a configuration error. A file with no usable links
/// yields an empty batch with a warning, leaving the caller to decide whether to proceed.
pub fn read_links(path: impl AsRef<Path>) -> Result<LinkBatch> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .map_err(|e| ScrapeError::Config(format!("Failed to read links file {}: {}", path.display(), e)))?;

    let batch = LinkBatch::parse(&text);
    if batch.is_empty() {
        log::warn!("Links file {} is empty or contains no valid links", path.display());
    } else {
        log::info!("Found {} links in {}", batch.len(), path.display());
    }

    Ok(batch)
}
