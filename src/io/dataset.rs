//! Read/write dataset JSON files.
//!
//! Dataset JSON is the "portable" representation of a merged run:
//! - the settings the derived fields depend on (down payment, loan term)
//! - the inflation reference CPI
//! - every merged record
//!
//! It can be reloaded with `hs show --dataset` without re-fetching sources.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{Dataset, HousingRecord, MergeStats, TERM_MONTHS};
use crate::error::AppError;

/// On-disk schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetFile {
    pub tool: String,
    pub down_payment: f64,
    pub term_months: i32,
    pub reference_cpi: f64,
    #[serde(default)]
    pub merge: MergeStats,
    pub records: Vec<HousingRecord>,
}

impl DatasetFile {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        Self {
            tool: "hs".to_string(),
            down_payment: dataset.down_payment,
            term_months: TERM_MONTHS,
            reference_cpi: dataset.reference_cpi,
            merge: dataset.merge.clone(),
            records: dataset.records.clone(),
        }
    }

    /// Rebuild an in-memory dataset (source stats are not persisted).
    pub fn into_dataset(self) -> Dataset {
        Dataset {
            records: self.records,
            reference_cpi: self.reference_cpi,
            down_payment: self.down_payment,
            merge: self.merge,
            sources: Vec::new(),
        }
    }
}

/// Write a dataset JSON file.
pub fn write_dataset_json(path: &Path, dataset: &Dataset) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create dataset JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(BufWriter::new(file), &DatasetFile::from_dataset(dataset))
        .map_err(|e| AppError::new(2, format!("Failed to write dataset JSON: {e}")))?;

    Ok(())
}

/// Read a dataset JSON file.
pub fn read_dataset_json(path: &Path) -> Result<Dataset, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open dataset JSON '{}': {e}", path.display())))?;
    let parsed: DatasetFile = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| AppError::new(2, format!("Invalid dataset JSON: {e}")))?;

    if parsed.records.windows(2).any(|w| w[0].date >= w[1].date) {
        return Err(AppError::new(2, "Invalid dataset JSON: records are not strictly increasing by date."));
    }

    Ok(parsed.into_dataset())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Period;

    fn record(year: i32, quarter: u32, cpiyoy: Option<f64>) -> HousingRecord {
        HousingRecord {
            date: Period::from_year_quarter(year, quarter).unwrap(),
            cpi: 300.0,
            cpiyoy,
            msp: 400_000.0,
            mspa: 400_000.0,
            m30: 0.07,
            mmp: 2128.97,
            mmpa: 2128.97,
        }
    }

    #[test]
    fn json_keeps_absent_yoy_as_null_and_dates_as_quarter_starts() {
        let dataset = Dataset {
            records: vec![record(2023, 4, None), record(2024, 1, Some(0.031))],
            reference_cpi: 300.0,
            down_payment: 0.2,
            merge: MergeStats { dropped: vec![1, 0, 2] },
            sources: Vec::new(),
        };

        let text = serde_json::to_string(&DatasetFile::from_dataset(&dataset)).unwrap();
        assert!(text.contains("\"date\":\"2023-10-01\""));
        assert!(text.contains("\"cpiyoy\":null"));
        assert!(text.contains("\"term_months\":360"));

        let back: DatasetFile = serde_json::from_str(&text).unwrap();
        let back = back.into_dataset();
        assert_eq!(back.records, dataset.records);
        assert_eq!(back.merge, dataset.merge);
    }

    #[test]
    fn file_roundtrip_through_disk() {
        let dataset = Dataset {
            records: vec![record(2020, 1, None)],
            reference_cpi: 300.0,
            down_payment: 0.1,
            merge: MergeStats::default(),
            sources: Vec::new(),
        };
        let path = std::env::temp_dir().join(format!("hs-dataset-{}.json", std::process::id()));
        write_dataset_json(&path, &dataset).unwrap();
        let back = read_dataset_json(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(back.records, dataset.records);
        assert_eq!(back.down_payment, 0.1);
    }

    #[test]
    fn zero_rate_payments_survive_a_disk_roundtrip() {
        let mut zero_rate = record(2021, 2, Some(0.05));
        zero_rate.m30 = 0.0;
        zero_rate.mmp = f64::NAN;
        zero_rate.mmpa = f64::NAN;
        let dataset = Dataset {
            records: vec![record(2021, 1, None), zero_rate],
            reference_cpi: 300.0,
            down_payment: 0.2,
            merge: MergeStats::default(),
            sources: Vec::new(),
        };

        let path = std::env::temp_dir().join(format!("hs-dataset-nan-{}.json", std::process::id()));
        write_dataset_json(&path, &dataset).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let back = read_dataset_json(&path);
        let _ = std::fs::remove_file(&path);

        assert!(text.contains("\"mmp\": null"));
        let back = back.unwrap();
        assert_eq!(back.records.len(), 2);
        assert_eq!(back.records[0], dataset.records[0]);
        let last = &back.records[1];
        assert!(last.mmp.is_nan());
        assert!(last.mmpa.is_nan());
        assert_eq!(last.m30, 0.0);
        assert_eq!(last.cpiyoy, Some(0.05));
    }
}
