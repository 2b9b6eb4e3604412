//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during the merge
//! - exported to JSON/CSV
//! - reloaded later for reporting without re-fetching

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::Period;

/// Fixed loan term used by the payment estimate (30 years, monthly).
pub const TERM_MONTHS: i32 = 360;

/// Default down payment fraction for the payment estimate.
pub const DEFAULT_DOWN_PAYMENT: f64 = 0.2;

/// The three input series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesId {
    /// Consumer Price Index for All Urban Consumers (index level, monthly).
    Cpi,
    /// Median Sales Price of Houses Sold (USD, quarterly).
    Msp,
    /// 30-Year Fixed Rate Mortgage Average (percent, weekly).
    M30,
}

impl SeriesId {
    pub const ALL: [SeriesId; 3] = [SeriesId::Cpi, SeriesId::Msp, SeriesId::M30];

    /// FRED series code, also the value column name in FRED CSV downloads.
    pub fn code(self) -> &'static str {
        match self {
            SeriesId::Cpi => "CPIAUCSL",
            SeriesId::Msp => "MSPUS",
            SeriesId::M30 => "MORTGAGE30US",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            SeriesId::Cpi => "Consumer Price Index",
            SeriesId::Msp => "Median Sales Price",
            SeriesId::M30 => "Average 30 Year Mortgage Rate",
        }
    }

    /// Multiplier applied to raw values at ingest.
    ///
    /// The mortgage rate is published in percent; we carry it as a fraction.
    pub fn scale(self) -> f64 {
        match self {
            SeriesId::M30 => 0.01,
            SeriesId::Cpi | SeriesId::Msp => 1.0,
        }
    }

    /// Environment variable that overrides the default source location.
    pub fn env_var(self) -> &'static str {
        match self {
            SeriesId::Cpi => "HS_CPI_SOURCE",
            SeriesId::Msp => "HS_MSP_SOURCE",
            SeriesId::M30 => "HS_M30_SOURCE",
        }
    }
}

impl fmt::Display for SeriesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One reading, already normalized to its quarter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub period: Period,
    pub value: f64,
}

/// A named, chronologically ordered sequence of samples.
///
/// Several samples may share a period when the source is sampled more finely
/// than quarterly (weekly mortgage rates, monthly CPI).
#[derive(Debug, Clone)]
pub struct Series {
    pub id: SeriesId,
    pub samples: Vec<Sample>,
}

impl Series {
    pub fn new(id: SeriesId, samples: Vec<Sample>) -> Self {
        Self { id, samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn first_period(&self) -> Option<Period> {
        self.samples.first().map(|s| s.period)
    }

    pub fn last_period(&self) -> Option<Period> {
        self.samples.last().map(|s| s.period)
    }

    /// Number of distinct periods covered.
    pub fn period_count(&self) -> usize {
        let mut count = 0;
        let mut prev = None;
        for s in &self.samples {
            if prev != Some(s.period) {
                count += 1;
                prev = Some(s.period);
            }
        }
        count
    }
}

/// Where to read a source from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    Url(String),
    Path(PathBuf),
}

impl SourceLocation {
    /// `http://` and `https://` strings are URLs; anything else is a path.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.starts_with("http://") || raw.starts_with("https://") {
            SourceLocation::Url(raw.to_string())
        } else {
            SourceLocation::Path(PathBuf::from(raw))
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceLocation::Url(url) => f.write_str(url),
            SourceLocation::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// A source to fetch, paired with the series it provides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpec {
    pub series: SeriesId,
    pub location: SourceLocation,
}

/// A row-level error encountered during ingest (the row is skipped).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// What ingest did with one source.
#[derive(Debug, Clone)]
pub struct SourceStats {
    pub series: SeriesId,
    pub location: String,
    pub rows_read: usize,
    pub rows_used: usize,
    /// Rows carrying FRED's missing marker (`.`) or an empty value.
    pub rows_missing: usize,
    pub row_errors: Vec<RowError>,
    pub first_period: Option<Period>,
    pub last_period: Option<Period>,
    pub period_count: usize,
}

/// What the merge did, per input series (same order as `SeriesId::ALL`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeStats {
    /// Samples skipped because they fell behind the merge frontier.
    pub dropped: Vec<usize>,
}

/// One merged quarter with its derived fields.
///
/// Field names follow the exported column names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HousingRecord {
    /// Quarter start.
    pub date: Period,
    /// Average CPI level over the quarter.
    #[serde(deserialize_with = "null_as_nan")]
    pub cpi: f64,
    /// CPI change against the same quarter one year earlier.
    pub cpiyoy: Option<f64>,
    /// Median sales price (USD).
    #[serde(deserialize_with = "null_as_nan")]
    pub msp: f64,
    /// Median sales price in dollars of the last quarter.
    #[serde(deserialize_with = "null_as_nan")]
    pub mspa: f64,
    /// 30-year mortgage rate as a fraction (0.065 = 6.5%).
    #[serde(deserialize_with = "null_as_nan")]
    pub m30: f64,
    /// Estimated monthly payment on the median house.
    #[serde(deserialize_with = "null_as_nan")]
    pub mmp: f64,
    /// Monthly payment in dollars of the last quarter.
    #[serde(deserialize_with = "null_as_nan")]
    pub mmpa: f64,
}

/// `serde_json` writes non-finite floats as `null`; read them back as NaN.
fn null_as_nan<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

/// The merged, derived dataset. Built once, then only read.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub records: Vec<HousingRecord>,
    /// CPI of the last record; every adjusted field is expressed against it.
    pub reference_cpi: f64,
    pub down_payment: f64,
    pub merge: MergeStats,
    pub sources: Vec<SourceStats>,
}

impl Dataset {
    pub fn first_period(&self) -> Option<Period> {
        self.records.first().map(|r| r.date)
    }

    pub fn last_period(&self) -> Option<Period> {
        self.records.last().map(|r| r.date)
    }

    /// Binary search by quarter (records are strictly increasing by date).
    pub fn find(&self, period: Period) -> Option<&HousingRecord> {
        self.records
            .binary_search_by_key(&period, |r| r.date)
            .ok()
            .map(|idx| &self.records[idx])
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags, environment, and defaults.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    pub sources: Vec<SourceSpec>,
    pub down_payment: f64,
    /// Number of trailing rows to print in the report (0 = all).
    pub rows: usize,
    pub export_csv: Option<PathBuf>,
    pub export_json: Option<PathBuf>,
    pub debug: bool,
}

impl BuildConfig {
    pub fn source(&self, series: SeriesId) -> Option<&SourceSpec> {
        self.sources.iter().find(|s| s.series == series)
    }
}
