//! Export merged records to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.
//! Column names match the `HousingRecord` fields; `cpiyoy` is empty for the
//! first four quarters.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::domain::HousingRecord;
use crate::error::AppError;

pub const CSV_HEADER: &str = "date,quarter,cpi,cpiyoy,msp,mspa,m30,mmp,mmpa";

/// Write records to a CSV file.
pub fn write_records_csv(path: &Path, records: &[HousingRecord]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    let mut out = BufWriter::new(file);
    write_records(&mut out, records)?;
    out.flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

/// Write records as CSV to any writer.
pub fn write_records<W: Write>(out: &mut W, records: &[HousingRecord]) -> Result<(), AppError> {
    writeln!(out, "{CSV_HEADER}")
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for r in records {
        writeln!(
            out,
            "{},{},{:.3},{},{:.2},{:.2},{:.6},{:.2},{:.2}",
            r.date.start(),
            r.date.label(),
            r.cpi,
            r.cpiyoy.map(|v| format!("{v:.6}")).unwrap_or_default(),
            r.msp,
            r.mspa,
            r.m30,
            r.mmp,
            r.mmpa,
        )
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Period;

    #[test]
    fn csv_rows_leave_missing_yoy_empty() {
        let records = vec![HousingRecord {
            date: Period::from_year_quarter(2022, 1).unwrap(),
            cpi: 283.5,
            cpiyoy: None,
            msp: 433_100.0,
            mspa: 455_000.5,
            m30: 0.0379,
            mmp: 1612.5,
            mmpa: 1700.0,
        }];

        let mut buf = Vec::new();
        write_records(&mut buf, &records).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let expected = concat!(
            "date,quarter,cpi,cpiyoy,msp,mspa,m30,mmp,mmpa\n",
            "2022-01-01,2022 Q1,283.500,,433100.00,455000.50,0.037900,1612.50,1700.00\n",
        );
        assert_eq!(text, expected);
    }
}
