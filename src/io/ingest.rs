//! CSV ingest and normalization.
//!
//! This module turns one FRED-style CSV (`DATE,<CODE>` or
//! `observation_date,<CODE>`) into a [`Series`] of quarter-normalized samples.
//!
//! - **Strict schema** for the date and value columns (exit code 2)
//! - **Row-level validation**: bad rows are skipped and reported, never turned
//!   into NaN
//! - FRED's missing marker `.` is counted separately and skipped

use std::collections::HashMap;
use std::io::Read;

use chrono::NaiveDate;
use csv::StringRecord;
use tracing::{debug, warn};

use crate::domain::{Period, RowError, Sample, Series, SeriesId, SourceStats};
use crate::error::AppError;

const DATE_COLUMNS: [&str; 2] = ["date", "observation_date"];

/// Ingest output: the normalized series plus what happened to each row.
#[derive(Debug, Clone)]
pub struct IngestedSeries {
    pub series: Series,
    pub stats: SourceStats,
}

enum RowOutcome {
    Sample(NaiveDate, Sample),
    Missing,
}

/// Parse a CSV from `reader` into a quarter-normalized series.
///
/// `location` is only used for messages and stats.
pub fn read_series<R: Read>(reader: R, id: SeriesId, location: &str) -> Result<IngestedSeries, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers from {location}: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    let date_idx = DATE_COLUMNS
        .iter()
        .find_map(|name| header_map.get(*name).copied())
        .ok_or_else(|| {
            AppError::new(
                2,
                format!("Missing date column (`DATE` or `observation_date`) in {location}"),
            )
        })?;
    let value_name = id.code().to_ascii_lowercase();
    let value_idx = *header_map
        .get(&value_name)
        .ok_or_else(|| AppError::new(2, format!("Missing value column `{}` in {location}", id.code())))?;

    let mut samples: Vec<Sample> = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;
    let mut rows_missing = 0usize;
    let mut last_date: Option<NaiveDate> = None;

    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header, and lines are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, date_idx, value_idx, id.scale()) {
            Ok(RowOutcome::Sample(date, sample)) => {
                if let Some(prev) = last_date.filter(|p| date < *p) {
                    row_errors.push(RowError {
                        line,
                        message: format!("Out of chronological order ({date} after {prev})."),
                    });
                    continue;
                }
                last_date = Some(date);
                samples.push(sample);
            }
            Ok(RowOutcome::Missing) => rows_missing += 1,
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    for err in &row_errors {
        warn!(series = %id, line = err.line, "skipped row: {}", err.message);
    }

    let series = Series::new(id, samples);
    let stats = SourceStats {
        series: id,
        location: location.to_string(),
        rows_read,
        rows_used: series.len(),
        rows_missing,
        row_errors,
        first_period: series.first_period(),
        last_period: series.last_period(),
        period_count: series.period_count(),
    };

    debug!(
        series = %id,
        rows_read,
        rows_used = stats.rows_used,
        rows_missing,
        errors = stats.row_errors.len(),
        "ingested source"
    );

    Ok(IngestedSeries { series, stats })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn parse_row(record: &StringRecord, date_idx: usize, value_idx: usize, scale: f64) -> Result<RowOutcome, String> {
    let raw_date = record
        .get(date_idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| "Missing date.".to_string())?;
    let date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d")
        .map_err(|_| format!("Invalid date '{raw_date}'. Expected YYYY-MM-DD."))?;

    let raw_value = record.get(value_idx).map(str::trim).unwrap_or("");
    if raw_value.is_empty() || raw_value == "." {
        return Ok(RowOutcome::Missing);
    }

    let value = raw_value
        .parse::<f64>()
        .map_err(|_| format!("Invalid number '{raw_value}'."))?;
    if !value.is_finite() {
        return Err(format!("Non-finite value '{raw_value}'."));
    }

    Ok(RowOutcome::Sample(
        date,
        Sample {
            period: Period::containing(date),
            value: value * scale,
        },
    ))
}
