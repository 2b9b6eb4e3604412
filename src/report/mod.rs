//! Reporting: highlights over a built dataset and formatted terminal output.

use crate::domain::{Dataset, HousingRecord, Period};
use crate::math::{argmax, argmin, pearson, value_extent};

pub mod format;

pub use format::*;

/// Padding applied to column extents.
const EXTENT_PAD: f64 = 0.04;

/// A column of `HousingRecord` that can be summarized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Cpi,
    CpiYoy,
    Msp,
    Mspa,
    M30,
    Mmp,
    Mmpa,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::Cpi,
        Field::CpiYoy,
        Field::Msp,
        Field::Mspa,
        Field::M30,
        Field::Mmp,
        Field::Mmpa,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Field::Cpi => "cpi",
            Field::CpiYoy => "cpiyoy",
            Field::Msp => "msp",
            Field::Mspa => "mspa",
            Field::M30 => "m30",
            Field::Mmp => "mmp",
            Field::Mmpa => "mmpa",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Field::Cpi => "Consumer Price Index",
            Field::CpiYoy => "CPI, year over year",
            Field::Msp => "Median Sales Price, unadjusted",
            Field::Mspa => "Median Sales Price, inflation-adjusted",
            Field::M30 => "Average 30 Year Mortgage Rate",
            Field::Mmp => "Median Monthly Payment, unadjusted",
            Field::Mmpa => "Median Monthly Payment, inflation-adjusted",
        }
    }

    /// Absent values read as NaN so they drop out of every statistic.
    pub fn value(self, r: &HousingRecord) -> f64 {
        match self {
            Field::Cpi => r.cpi,
            Field::CpiYoy => r.cpiyoy.unwrap_or(f64::NAN),
            Field::Msp => r.msp,
            Field::Mspa => r.mspa,
            Field::M30 => r.m30,
            Field::Mmp => r.mmp,
            Field::Mmpa => r.mmpa,
        }
    }

    pub fn column(self, records: &[HousingRecord]) -> Vec<f64> {
        records.iter().map(|r| self.value(r)).collect()
    }
}

/// Where a column peaked (or bottomed).
#[derive(Debug, Clone, PartialEq)]
pub struct Extreme {
    pub field: Field,
    pub period: Period,
    pub value: f64,
}

/// Padded value range of a column.
#[derive(Debug, Clone, PartialEq)]
pub struct Extent {
    pub field: Field,
    pub min: f64,
    pub max: f64,
}

/// Headline facts about a dataset.
#[derive(Debug, Clone, Default)]
pub struct Highlights {
    pub highs: Vec<Extreme>,
    pub lows: Vec<Extreme>,
    /// Correlation of the mortgage rate with the adjusted sales price.
    pub rate_vs_price: Option<f64>,
    /// Correlation of the mortgage rate with the adjusted monthly payment.
    pub rate_vs_payment: Option<f64>,
    pub extents: Vec<Extent>,
}

pub fn compute_highlights(dataset: &Dataset) -> Highlights {
    let records = &dataset.records;

    let extreme = |field: Field, pick: fn(&[f64]) -> Option<usize>| {
        let column = field.column(records);
        pick(&column).map(|idx| Extreme {
            field,
            period: records[idx].date,
            value: column[idx],
        })
    };

    let highs: Vec<Extreme> = [Field::Msp, Field::Mspa, Field::Mmp, Field::Mmpa, Field::M30]
        .into_iter()
        .filter_map(|f| extreme(f, argmax))
        .collect();
    let lows: Vec<Extreme> = [Field::M30, Field::Mmpa]
        .into_iter()
        .filter_map(|f| extreme(f, argmin))
        .collect();

    let m30 = Field::M30.column(records);
    let rate_vs_price = pearson(&m30, &Field::Mspa.column(records));
    let rate_vs_payment = pearson(&m30, &Field::Mmpa.column(records));

    let extents: Vec<Extent> = Field::ALL
        .into_iter()
        .filter_map(|field| {
            let floor_at_zero = !matches!(field, Field::CpiYoy);
            value_extent(&field.column(records), EXTENT_PAD, floor_at_zero)
                .map(|(min, max)| Extent { field, min, max })
        })
        .collect();

    Highlights {
        highs,
        lows,
        rate_vs_price,
        rate_vs_payment,
        extents,
    }
}
