//! FRED CSV sources: default locations, env overrides, and fetching.
//!
//! Sources are plain CSV downloads (no API key). Each may also point at a
//! local file, which is how offline runs and fixtures work.

use std::fs::File;

use rayon::prelude::*;
use reqwest::blocking::Client;
use tracing::{debug, info};

use crate::domain::{SeriesId, SourceLocation, SourceSpec};
use crate::error::AppError;
use crate::io::ingest::{IngestedSeries, read_series};

const GRAPH_CSV_URL: &str = "https://fred.stlouisfed.org/graph/fredgraph.csv";
const USER_AGENT: &str = concat!("housing-series/", env!("CARGO_PKG_VERSION"));

/// Default download URL for a series.
pub fn default_url(series: SeriesId) -> String {
    format!("{GRAPH_CSV_URL}?id={}", series.code())
}

/// Resolve a source location: explicit value, else env override, else FRED.
///
/// Env overrides only see `.env` values once `dotenvy` has loaded them (`app::run`).
pub fn resolve_location(series: SeriesId, explicit: Option<&str>) -> SourceLocation {
    if let Some(raw) = explicit {
        return SourceLocation::parse(raw);
    }
    match std::env::var(series.env_var()) {
        Ok(raw) if !raw.trim().is_empty() => SourceLocation::parse(&raw),
        _ => SourceLocation::Url(default_url(series)),
    }
}

pub struct SourceClient {
    client: Client,
}

impl SourceClient {
    /// Build the HTTP client.
    pub fn new() -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AppError::new(4, format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Fetch and ingest every source concurrently; fails if any one fails.
    ///
    /// Output order matches `specs`.
    pub fn fetch_all(&self, specs: &[SourceSpec]) -> Result<Vec<IngestedSeries>, AppError> {
        info!(sources = specs.len(), "fetching sources");
        specs.par_iter().map(|spec| self.fetch(spec)).collect()
    }

    pub fn fetch(&self, spec: &SourceSpec) -> Result<IngestedSeries, AppError> {
        let label = spec.location.to_string();
        match &spec.location {
            SourceLocation::Url(url) => {
                let body = self.fetch_text(spec.series, url)?;
                read_series(body.as_bytes(), spec.series, &label)
            }
            SourceLocation::Path(path) => {
                debug!(series = %spec.series, path = %path.display(), "reading local source");
                let file = File::open(path)
                    .map_err(|e| AppError::new(2, format!("Failed to open source CSV '{}': {e}", path.display())))?;
                read_series(file, spec.series, &label)
            }
        }
    }

    fn fetch_text(&self, series: SeriesId, url: &str) -> Result<String, AppError> {
        debug!(%series, url, "downloading source");
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| AppError::new(4, format!("Request for {series} failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::new(
                4,
                format!("Request for {series} failed with status {}.", resp.status()),
            ));
        }

        let body = resp
            .text()
            .map_err(|e| AppError::new(4, format!("Failed to read {series} response: {e}")))?;
        info!(%series, bytes = body.len(), "downloaded source");
        Ok(body)
    }
}
