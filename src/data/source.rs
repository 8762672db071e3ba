//! Source resolution and HTTP retrieval.

use std::path::PathBuf;
use std::time::Duration;

use bytes::Bytes;
use reqwest::blocking::Client;

use crate::error::AppError;

/// Where the arrivals table comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// Columnar file reachable over HTTP(S).
    Remote(String),
    /// Local Parquet or CSV file.
    File(PathBuf),
    /// Deterministic synthetic dataset (offline demos and tests).
    Sample { seed: u64 },
}

impl DataSource {
    /// Resolve a source identifier.
    ///
    /// Rules:
    /// - `http://…` / `https://…` -> remote
    /// - `sample` / `sample:SEED`  -> synthetic
    /// - anything else             -> local path
    pub fn parse(id: &str) -> Self {
        let id = id.trim();
        let lower = id.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            return DataSource::Remote(id.to_string());
        }
        if lower == "sample" {
            return DataSource::Sample { seed: 42 };
        }
        if let Some(seed) = lower.strip_prefix("sample:") {
            if let Ok(seed) = seed.parse::<u64>() {
                return DataSource::Sample { seed };
            }
        }
        DataSource::File(PathBuf::from(id))
    }

    /// Stable identifier, used as the cache key.
    pub fn id(&self) -> String {
        match self {
            DataSource::Remote(url) => url.clone(),
            DataSource::File(path) => path.display().to_string(),
            DataSource::Sample { seed } => format!("sample:{seed}"),
        }
    }
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Blocking HTTP client with a hard request timeout.
pub struct DataClient {
    client: Client,
}

impl DataClient {
    pub fn new(timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| AppError::new(4, format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Download the full body of `url`.
    ///
    /// Timeouts surface as ordinary request failures.
    pub fn fetch_bytes(&self, url: &str) -> Result<Bytes, AppError> {
        log::debug!("GET {url}");
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| AppError::new(4, format!("Request to {url} failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::new(
                4,
                format!("Request to {url} failed with status {}.", resp.status()),
            ));
        }

        let body = resp
            .bytes()
            .map_err(|e| AppError::new(4, format!("Failed to read response body from {url}: {e}")))?;
        log::debug!("fetched {} bytes from {url}", body.len());
        Ok(body)
    }
}
