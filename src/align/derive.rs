//! Derived affordability fields, computed over a completed merge.
//!
//! This is a second, batch-only pass: the inflation reference is the CPI of the
//! *last* merged quarter, so appending a quarter changes every adjusted value.

use tracing::warn;

use crate::align::{AlignError, AlignedRow};
use crate::domain::HousingRecord;
use crate::math::{inflation_adjusted, monthly_payment, year_over_year};

/// Quarterly lag for a year-over-year comparison.
pub const YOY_LAG: usize = 4;

/// Column positions of the three inputs inside an `AlignedRow`.
#[derive(Debug, Clone, Copy)]
pub struct Columns {
    pub cpi: usize,
    pub msp: usize,
    pub m30: usize,
}

impl Default for Columns {
    /// Order of `SeriesId::ALL`.
    fn default() -> Self {
        Self { cpi: 0, msp: 1, m30: 2 }
    }
}

/// Derived records plus the CPI they are expressed against.
#[derive(Debug, Clone)]
pub struct Derived {
    pub records: Vec<HousingRecord>,
    pub reference_cpi: f64,
}

pub fn derive_records(rows: &[AlignedRow], columns: Columns, down_payment: f64) -> Result<Derived, AlignError> {
    let last = rows.last().ok_or(AlignError::NoOverlapWindow)?;
    let reference_cpi = last.values[columns.cpi];

    let cpi: Vec<f64> = rows.iter().map(|r| r.values[columns.cpi]).collect();
    let cpiyoy = year_over_year(&cpi, YOY_LAG);

    let mut records = Vec::with_capacity(rows.len());
    for (row, cpiyoy) in rows.iter().zip(cpiyoy) {
        let cpi = row.values[columns.cpi];
        let msp = row.values[columns.msp];
        let m30 = row.values[columns.m30];

        let mmp = monthly_payment(msp, m30, down_payment);
        let record = HousingRecord {
            date: row.period,
            cpi,
            cpiyoy,
            msp,
            mspa: inflation_adjusted(msp, cpi, reference_cpi),
            m30,
            mmp,
            mmpa: inflation_adjusted(mmp, cpi, reference_cpi),
        };

        if !(record.mspa.is_finite() && record.mmp.is_finite() && record.mmpa.is_finite()) {
            warn!(quarter = %row.period, cpi, msp, m30, "non-finite derived value");
        }
        records.push(record);
    }

    Ok(Derived { records, reference_cpi })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Period;

    fn rows(cpi: &[f64], msp: &[f64], m30: &[f64]) -> Vec<AlignedRow> {
        (0..cpi.len())
            .map(|i| AlignedRow {
                period: Period::from_year_quarter(2000 + (i / 4) as i32, (i % 4) as u32 + 1).unwrap(),
                values: vec![cpi[i], msp[i], m30[i]],
            })
            .collect()
    }

    #[test]
    fn flat_inputs_produce_flat_outputs() {
        let r = rows(&[250.0; 8], &[300_000.0; 8], &[0.06; 8]);
        let out = derive_records(&r, Columns::default(), 0.2).unwrap();

        let expected_mmp = monthly_payment(300_000.0, 0.06, 0.2);
        assert_eq!(out.reference_cpi, 250.0);
        for rec in &out.records {
            assert!((rec.mspa - rec.msp).abs() < 1e-9);
            assert!((rec.mmp - expected_mmp).abs() < 1e-9);
            assert!((rec.mmpa - rec.mmp).abs() < 1e-9);
        }
        assert!(out.records[..4].iter().all(|r| r.cpiyoy.is_none()));
        assert!(out.records[4..].iter().all(|r| r.cpiyoy.unwrap().abs() < 1e-12));
    }

    #[test]
    fn doubling_cpi_doubles_the_first_adjusted_price() {
        let cpi = [100.0, 125.0, 150.0, 175.0, 200.0];
        let r = rows(&cpi, &[300_000.0; 5], &[0.05; 5]);
        let out = derive_records(&r, Columns::default(), 0.2).unwrap();

        let first = &out.records[0];
        let last = &out.records[4];
        assert!((first.mspa - first.msp * 2.0).abs() < 1e-9);
        assert_eq!(last.mspa, last.msp);
        assert_eq!(last.mmpa, last.mmp);
        assert!((last.cpiyoy.unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn yoy_uses_a_four_quarter_lag() {
        let cpi: Vec<f64> = (0..10).map(|i| 100.0 + i as f64 * 3.0).collect();
        let r = rows(&cpi, &[1.0; 10], &[0.05; 10]);
        let out = derive_records(&r, Columns::default(), 0.2).unwrap();
        for i in 4..10 {
            let expected = cpi[i] / cpi[i - 4] - 1.0;
            assert!((out.records[i].cpiyoy.unwrap() - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn zero_rate_quarter_carries_nan_payment() {
        let r = rows(&[100.0, 100.0], &[200_000.0, 200_000.0], &[0.0, 0.05]);
        let out = derive_records(&r, Columns::default(), 0.2).unwrap();
        assert!(out.records[0].mmp.is_nan());
        assert!(out.records[0].mmpa.is_nan());
        assert!(out.records[1].mmp.is_finite());
    }

    #[test]
    fn empty_merge_has_no_reference() {
        assert!(matches!(
            derive_records(&[], Columns::default(), 0.2),
            Err(AlignError::NoOverlapWindow)
        ));
    }
}
