//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the merge/derive code stays clean and testable
//! - output changes are localized (golden tests below)

use crate::domain::{Dataset, HousingRecord, SourceStats};
use crate::report::{Field, Highlights};

/// Row errors listed per source before eliding the rest.
const MAX_ROW_ERRORS_SHOWN: usize = 5;

/// Format the full run summary (sources + merge window + highlights).
pub fn format_run_summary(dataset: &Dataset, highlights: &Highlights) -> String {
    let mut out = String::new();

    out.push_str("=== hs - US Housing Affordability (FRED-based) ===\n");

    if !dataset.sources.is_empty() {
        out.push_str("Sources:\n");
        for s in &dataset.sources {
            out.push_str(&format_source(s));
        }
    }

    let window = match (dataset.first_period(), dataset.last_period()) {
        (Some(first), Some(last)) => format!("{first}..{last}"),
        _ => "-".to_string(),
    };
    out.push_str(&format!(
        "Merged: n={} | {window} | reference CPI={:.3}\n",
        dataset.records.len(),
        dataset.reference_cpi
    ));

    if !dataset.merge.dropped.is_empty() {
        let parts: Vec<String> = dataset
            .sources
            .iter()
            .map(|s| s.series.code().to_string())
            .chain(std::iter::repeat("?".to_string()))
            .zip(&dataset.merge.dropped)
            .map(|(code, n)| format!("{code}={n}"))
            .collect();
        out.push_str(&format!("Dropped behind merge frontier: {}\n", parts.join(" ")));
    }
    out.push_str(&format!(
        "Payment model: 30y fixed, {:.0}% down\n",
        dataset.down_payment * 100.0
    ));

    out.push_str("\nHighlights:\n");
    for e in &highlights.highs {
        out.push_str(&format!(
            "  All-time high {:<44} {:>12} in {}\n",
            e.field.description(),
            fmt_field(e.field, e.value),
            e.period
        ));
    }
    for e in &highlights.lows {
        out.push_str(&format!(
            "  Lowest        {:<44} {:>12} in {}\n",
            e.field.description(),
            fmt_field(e.field, e.value),
            e.period
        ));
    }
    out.push_str(&format!(
        "  Correlation 30YR vs MSPA: {}\n",
        fmt_corr(highlights.rate_vs_price)
    ));
    out.push_str(&format!(
        "  Correlation 30YR vs MMPA: {}\n",
        fmt_corr(highlights.rate_vs_payment)
    ));

    if !highlights.extents.is_empty() {
        out.push_str("\nRanges (padded 4%):\n");
        for e in &highlights.extents {
            out.push_str(&format!(
                "  {:<7} [{}, {}]\n",
                e.field.name(),
                fmt_field(e.field, e.min),
                fmt_field(e.field, e.max)
            ));
        }
    }
    out.push('\n');

    out
}

fn format_source(s: &SourceStats) -> String {
    let mut out = String::new();
    let range = match (s.first_period, s.last_period) {
        (Some(first), Some(last)) => format!("{first}..{last} ({} quarters)", s.period_count),
        _ => "no data".to_string(),
    };
    out.push_str(&format!(
        "  {:<13} rows={} used={} missing={} errors={} | {range}\n",
        s.series.code(),
        s.rows_read,
        s.rows_used,
        s.rows_missing,
        s.row_errors.len()
    ));
    out.push_str(&format!("    {}\n", s.location));
    for err in s.row_errors.iter().take(MAX_ROW_ERRORS_SHOWN) {
        out.push_str(&format!("    line {}: {}\n", err.line, err.message));
    }
    if s.row_errors.len() > MAX_ROW_ERRORS_SHOWN {
        out.push_str(&format!(
            "    ... {} more\n",
            s.row_errors.len() - MAX_ROW_ERRORS_SHOWN
        ));
    }
    out
}

/// Format the record table.
pub fn format_table(rows: &[HousingRecord]) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<8} {:>8} {:>8} {:>10} {:>10} {:>7} {:>8} {:>8}\n",
            "quarter", "cpi", "cpi yoy", "msp", "mspa", "m30", "mmp", "mmpa"
        )
        .trim_end(),
    );
    out.push('\n');

    out.push_str(
        format!(
            "{:-<8} {:-<8} {:-<8} {:-<10} {:-<10} {:-<7} {:-<8} {:-<8}\n",
            "", "", "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for r in rows {
        out.push_str(
            format!(
                "{:<8} {:>8.2} {:>8} {:>10} {:>10} {:>7} {:>8} {:>8}\n",
                r.date.label(),
                r.cpi,
                fmt_opt_pct(r.cpiyoy),
                fmt_money(r.msp),
                fmt_money(r.mspa),
                fmt_pct(r.m30),
                fmt_money(r.mmp),
                fmt_money(r.mmpa),
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

/// Last `n` rows (all rows when `n == 0`).
pub fn tail(rows: &[HousingRecord], n: usize) -> &[HousingRecord] {
    if n == 0 || n >= rows.len() {
        rows
    } else {
        &rows[rows.len() - n..]
    }
}

/// Detail block for a single quarter.
pub fn format_quarter(record: &HousingRecord, dataset: &Dataset) -> String {
    let mut out = String::new();
    out.push_str(&format!("{} (from {})\n", record.date, record.date.start()));
    for field in Field::ALL {
        out.push_str(&format!(
            "  {:<44} {:>7} {:>12}\n",
            field.description(),
            format!("({})", field.name()),
            fmt_field(field, field.value(record))
        ));
    }
    if let Some(last) = dataset.last_period() {
        out.push_str(&format!(
            "  Adjusted values are in {last} dollars (CPI {:.3}).\n",
            dataset.reference_cpi
        ));
    }
    out
}

/// One-line payment estimate.
pub fn format_payment(price: f64, annual_rate: f64, down_payment: f64, payment: f64) -> String {
    format!(
        "price={} rate={} down={:.0}% term=360m -> monthly payment {}\n",
        fmt_money(price),
        fmt_pct(annual_rate),
        down_payment * 100.0,
        fmt_money_cents(payment)
    )
}

fn fmt_field(field: Field, v: f64) -> String {
    match field {
        Field::Cpi => fmt_num(v, 3),
        Field::CpiYoy | Field::M30 => fmt_pct(v),
        Field::Msp | Field::Mspa | Field::Mmp | Field::Mmpa => fmt_money(v),
    }
}

fn fmt_num(v: f64, decimals: usize) -> String {
    if v.is_finite() {
        format!("{v:.decimals$}")
    } else {
        "n/a".to_string()
    }
}

fn fmt_pct(v: f64) -> String {
    if v.is_finite() {
        format!("{:.2}%", v * 100.0)
    } else {
        "n/a".to_string()
    }
}

fn fmt_opt_pct(v: Option<f64>) -> String {
    v.map(fmt_pct).unwrap_or_else(|| "-".to_string())
}

fn fmt_corr(v: Option<f64>) -> String {
    v.map(|c| format!("{c:+.3}")).unwrap_or_else(|| "n/a".to_string())
}

/// Whole dollars with thousands separators (`$1,234`).
pub fn fmt_money(v: f64) -> String {
    if !v.is_finite() {
        return "n/a".to_string();
    }
    let sign = if v < 0.0 { "-" } else { "" };
    format!("{sign}${}", group_thousands(&format!("{:.0}", v.abs())))
}

fn fmt_money_cents(v: f64) -> String {
    if !v.is_finite() {
        return "n/a".to_string();
    }
    let sign = if v < 0.0 { "-" } else { "" };
    let text = format!("{:.2}", v.abs());
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    format!("{sign}${}.{cents}", group_thousands(whole))
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MergeStats, Period, RowError, SeriesId};
    use crate::report::compute_highlights;

    fn record(year: i32, quarter: u32, cpiyoy: Option<f64>, mmp: f64) -> HousingRecord {
        HousingRecord {
            date: Period::from_year_quarter(year, quarter).unwrap(),
            cpi: 296.5,
            cpiyoy,
            msp: 442_600.0,
            mspa: 466_123.4,
            m30: 0.0667,
            mmp,
            mmpa: 2398.4,
        }
    }

    #[test]
    fn money_groups_thousands() {
        assert_eq!(fmt_money(0.0), "$0");
        assert_eq!(fmt_money(999.4), "$999");
        assert_eq!(fmt_money(1_000.0), "$1,000");
        assert_eq!(fmt_money(442_600.0), "$442,600");
        assert_eq!(fmt_money(-1_234_567.0), "-$1,234,567");
        assert_eq!(fmt_money(f64::NAN), "n/a");
        assert_eq!(fmt_money_cents(1438.9178), "$1,438.92");
    }

    #[test]
    fn table_golden_snapshot() {
        let rows = vec![record(2022, 4, Some(0.0712), 2277.7), record(2023, 1, None, f64::NAN)];
        let txt = format_table(&rows);
        let expected = concat!(
            "quarter       cpi  cpi yoy        msp       mspa     m30      mmp     mmpa\n",
            "-------- -------- -------- ---------- ---------- ------- -------- --------\n",
            "2022 Q4    296.50    7.12%   $442,600   $466,123   6.67%   $2,278   $2,398\n",
            "2023 Q1    296.50        -   $442,600   $466,123   6.67%      n/a   $2,398\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn tail_returns_trailing_rows() {
        let rows = vec![record(2022, 1, None, 1.0), record(2022, 2, None, 2.0), record(2022, 3, None, 3.0)];
        assert_eq!(tail(&rows, 0).len(), 3);
        assert_eq!(tail(&rows, 2)[0].date.label(), "2022 Q2");
        assert_eq!(tail(&rows, 10).len(), 3);
    }

    #[test]
    fn summary_mentions_window_sources_and_row_errors() {
        let dataset = Dataset {
            records: vec![record(2022, 4, None, 2277.7), record(2023, 1, None, 2300.0)],
            reference_cpi: 296.5,
            down_payment: 0.2,
            merge: MergeStats { dropped: vec![3, 0, 7] },
            sources: SeriesId::ALL
                .iter()
                .map(|&series| SourceStats {
                    series,
                    location: format!("fixtures/{}.csv", series.code()),
                    rows_read: 10,
                    rows_used: 9,
                    rows_missing: 0,
                    row_errors: vec![RowError {
                        line: 4,
                        message: "Invalid number 'abc'.".to_string(),
                    }],
                    first_period: Period::from_year_quarter(2022, 1),
                    last_period: Period::from_year_quarter(2023, 1),
                    period_count: 5,
                })
                .collect(),
        };
        let txt = format_run_summary(&dataset, &compute_highlights(&dataset));

        assert!(txt.contains("Merged: n=2 | 2022 Q4..2023 Q1 | reference CPI=296.500"));
        assert!(txt.contains("Dropped behind merge frontier: CPIAUCSL=3 MSPUS=0 MORTGAGE30US=7"));
        assert!(txt.contains("  MORTGAGE30US  rows=10 used=9 missing=0 errors=1 | 2022 Q1..2023 Q1 (5 quarters)"));
        assert!(txt.contains("    line 4: Invalid number 'abc'."));
        assert!(txt.contains("Payment model: 30y fixed, 20% down"));
        assert!(txt.contains("$442,600 in 2022 Q4"));
    }

    #[test]
    fn payment_line_shows_cents_and_nan_boundary() {
        assert_eq!(
            format_payment(300_000.0, 0.06, 0.2, 1438.9178),
            "price=$300,000 rate=6.00% down=20% term=360m -> monthly payment $1,438.92\n"
        );
        assert!(format_payment(300_000.0, 0.0, 0.2, f64::NAN).ends_with("monthly payment n/a\n"));
    }
}
