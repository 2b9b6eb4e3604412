//! Debug bundle writer for inspecting source ingest and the merge.

use std::fs::{File, create_dir_all};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::domain::{Dataset, SourceStats};
use crate::error::AppError;

/// Write a markdown bundle under `debug/` and return its path.
pub fn write_debug_bundle(dataset: &Dataset) -> Result<PathBuf, AppError> {
    write_debug_bundle_in(Path::new("debug"), dataset)
}

pub fn write_debug_bundle_in(dir: &Path, dataset: &Dataset) -> Result<PathBuf, AppError> {
    create_dir_all(dir).map_err(|e| AppError::new(2, format!("Failed to create debug dir: {e}")))?;

    let ts = Local::now().format("%Y%m%d_%H%M%S");
    let last = dataset
        .last_period()
        .map(|p| p.start().format("%Y%m%d").to_string())
        .unwrap_or_else(|| "empty".to_string());
    let path = dir.join(format!("hs_debug_{last}_{ts}.md"));

    let mut file = File::create(&path)
        .map_err(|e| AppError::new(2, format!("Failed to create debug file: {e}")))?;

    writeln!(file, "# hs debug bundle")
        .map_err(|e| AppError::new(2, format!("Failed to write debug header: {e}")))?;
    writeln!(file, "- generated: {}", Local::now().to_rfc3339())
        .map_err(|e| AppError::new(2, format!("Failed to write debug header: {e}")))?;
    writeln!(file, "- records: {}", dataset.records.len())
        .map_err(|e| AppError::new(2, format!("Failed to write debug header: {e}")))?;
    writeln!(file, "- reference_cpi: {:.3}", dataset.reference_cpi)
        .map_err(|e| AppError::new(2, format!("Failed to write debug header: {e}")))?;
    writeln!(file, "- down_payment: {:.3}", dataset.down_payment)
        .map_err(|e| AppError::new(2, format!("Failed to write debug header: {e}")))?;

    writeln!(file, "\n## Sources")
        .map_err(|e| AppError::new(2, format!("Failed to write debug: {e}")))?;
    writeln!(file, "| series | location | rows | used | missing | errors | first | last | quarters | dropped |")
        .map_err(|e| AppError::new(2, format!("Failed to write debug: {e}")))?;
    writeln!(file, "| - | - | - | - | - | - | - | - | - | - |")
        .map_err(|e| AppError::new(2, format!("Failed to write debug: {e}")))?;
    for (idx, s) in dataset.sources.iter().enumerate() {
        let dropped = dataset.merge.dropped.get(idx).copied();
        write_source_row(&mut file, s, dropped)?;
    }

    for s in dataset.sources.iter().filter(|s| !s.row_errors.is_empty()) {
        writeln!(file, "\n### Skipped rows: {}", s.series.code())
            .map_err(|e| AppError::new(2, format!("Failed to write debug: {e}")))?;
        for err in &s.row_errors {
            writeln!(file, "- line {}: {}", err.line, err.message)
                .map_err(|e| AppError::new(2, format!("Failed to write debug: {e}")))?;
        }
    }

    writeln!(file, "\n## Merged records")
        .map_err(|e| AppError::new(2, format!("Failed to write debug: {e}")))?;
    writeln!(file, "| quarter | cpi | cpiyoy | msp | mspa | m30 | mmp | mmpa |")
        .map_err(|e| AppError::new(2, format!("Failed to write debug: {e}")))?;
    writeln!(file, "| - | - | - | - | - | - | - | - |")
        .map_err(|e| AppError::new(2, format!("Failed to write debug: {e}")))?;
    for r in &dataset.records {
        writeln!(
            file,
            "| {} | {:.3} | {} | {:.2} | {:.2} | {:.6} | {:.2} | {:.2} |",
            r.date,
            r.cpi,
            fmt_opt(r.cpiyoy),
            r.msp,
            r.mspa,
            r.m30,
            r.mmp,
            r.mmpa
        )
        .map_err(|e| AppError::new(2, format!("Failed to write debug: {e}")))?;
    }

    Ok(path)
}

fn write_source_row(file: &mut File, s: &SourceStats, dropped: Option<usize>) -> Result<(), AppError> {
    writeln!(
        file,
        "| {} | {} | {} | {} | {} | {} | {} | {} | {} | {} |",
        s.series.code(),
        s.location,
        s.rows_read,
        s.rows_used,
        s.rows_missing,
        s.row_errors.len(),
        s.first_period.map(|p| p.label()).unwrap_or_else(|| "-".to_string()),
        s.last_period.map(|p| p.label()).unwrap_or_else(|| "-".to_string()),
        s.period_count,
        dropped.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
    )
    .map_err(|e| AppError::new(2, format!("Failed to write debug: {e}")))?;
    Ok(())
}

fn fmt_opt(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.6}"),
        _ => "-".to_string(),
    }
}
