//! Shared build pipeline used by every command that needs fresh data.
//!
//! source fetch (concurrent) -> ingest -> align -> derive -> `Dataset`
//!
//! The returned `Dataset` is immutable; front-ends only borrow it.

use tracing::info;

use crate::align::{Columns, align_series, derive_records};
use crate::data::SourceClient;
use crate::domain::{BuildConfig, Dataset, MergeStats, Series, SeriesId};
use crate::error::AppError;
use crate::io::ingest::IngestedSeries;

/// Fetch every configured source and build the dataset.
pub fn build_dataset(config: &BuildConfig) -> Result<Dataset, AppError> {
    let specs: Vec<_> = SeriesId::ALL
        .iter()
        .map(|&id| {
            config
                .source(id)
                .cloned()
                .ok_or_else(|| AppError::new(2, format!("No source configured for {id}.")))
        })
        .collect::<Result<_, _>>()?;

    let client = SourceClient::new()?;
    let ingested = client.fetch_all(&specs)?;

    build_from_ingested(ingested, config.down_payment)
}

/// Build the dataset from already-ingested sources (any order).
pub fn build_from_ingested(ingested: Vec<IngestedSeries>, down_payment: f64) -> Result<Dataset, AppError> {
    validate_down_payment(down_payment)?;

    let mut sources = Vec::with_capacity(SeriesId::ALL.len());
    let mut series: Vec<Series> = Vec::with_capacity(SeriesId::ALL.len());
    for id in SeriesId::ALL {
        let found = ingested
            .iter()
            .find(|i| i.series.id == id)
            .ok_or_else(|| AppError::new(2, format!("Missing input series {id}.")))?;
        sources.push(found.stats.clone());
        series.push(found.series.clone());
    }

    let refs: Vec<&Series> = series.iter().collect();
    let alignment = align_series(&refs)?;
    let derived = derive_records(&alignment.rows, Columns::default(), down_payment)?;

    let dataset = Dataset {
        records: derived.records,
        reference_cpi: derived.reference_cpi,
        down_payment,
        merge: MergeStats {
            dropped: alignment.dropped,
        },
        sources,
    };

    info!(
        records = dataset.records.len(),
        first = ?dataset.first_period().map(|p| p.label()),
        last = ?dataset.last_period().map(|p| p.label()),
        reference_cpi = dataset.reference_cpi,
        "built dataset"
    );

    Ok(dataset)
}

pub fn validate_down_payment(down_payment: f64) -> Result<(), AppError> {
    if !(down_payment.is_finite() && (0.0..1.0).contains(&down_payment)) {
        return Err(AppError::new(
            2,
            format!("Down payment must be a fraction in [0, 1), got {down_payment}."),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::ingest::read_series;
    use crate::math::monthly_payment;

    fn ingest(csv: &str, id: SeriesId) -> IngestedSeries {
        read_series(csv.as_bytes(), id, "inline").unwrap()
    }

    /// Monthly CPI doubling over two years, quarterly MSP, weekly-ish M30.
    fn fixture() -> Vec<IngestedSeries> {
        let mut cpi = String::from("DATE,CPIAUCSL\n");
        for (i, month) in (1..=12).chain(1..=12).enumerate() {
            let year = if i < 12 { 2020 } else { 2021 };
            cpi.push_str(&format!("{year}-{month:02}-01,{}\n", 100.0 + i as f64 * (100.0 / 23.0)));
        }

        let msp = "DATE,MSPUS\n\
                   2020-04-01,300000\n2020-07-01,300000\n2020-10-01,300000\n\
                   2021-01-01,300000\n2021-04-01,300000\n2021-07-01,300000\n2021-10-01,300000\n";

        let mut m30 = String::from("observation_date,MORTGAGE30US\n");
        for date in [
            "2020-02-06", "2020-04-02", "2020-04-16", "2020-07-02", "2020-10-01",
            "2021-01-07", "2021-04-01", "2021-07-01", "2021-10-07",
        ] {
            m30.push_str(&format!("{date},6.0\n"));
        }

        vec![
            ingest(&m30, SeriesId::M30),
            ingest(&cpi, SeriesId::Cpi),
            ingest(msp, SeriesId::Msp),
        ]
    }

    #[test]
    fn builds_the_overlap_window_with_derived_fields() {
        let dataset = build_from_ingested(fixture(), 0.2).unwrap();

        // MSP starts in 2020 Q2; everything ends in 2021 Q4.
        assert_eq!(dataset.first_period().unwrap().label(), "2020 Q2");
        assert_eq!(dataset.last_period().unwrap().label(), "2021 Q4");
        assert_eq!(dataset.records.len(), 7);
        assert!(dataset.records.windows(2).all(|w| w[0].date < w[1].date));

        let last = dataset.records.last().unwrap();
        assert_eq!(dataset.reference_cpi, last.cpi);
        assert_eq!(last.mspa, last.msp);

        let expected = monthly_payment(300_000.0, 0.06, 0.2);
        for r in &dataset.records {
            assert!((r.m30 - 0.06).abs() < 1e-12);
            assert!((r.mmp - expected).abs() < 1e-9);
            assert!(r.mspa >= r.msp);
        }
        assert!(dataset.records[..4].iter().all(|r| r.cpiyoy.is_none()));
        assert!(dataset.records[4].cpiyoy.unwrap() > 0.0);

        // CPI 2020 Q1 and the lone M30 Q1 reading were behind the frontier.
        assert_eq!(dataset.merge.dropped, vec![3, 0, 1]);
        assert_eq!(dataset.sources.len(), 3);
        assert_eq!(dataset.sources[0].series, SeriesId::Cpi);
    }

    #[test]
    fn find_locates_quarters_inside_the_window() {
        let dataset = build_from_ingested(fixture(), 0.2).unwrap();
        let q = "2021 Q1".parse().unwrap();
        assert_eq!(dataset.find(q).unwrap().date, q);
        assert!(dataset.find("2019 Q4".parse().unwrap()).is_none());
    }

    #[test]
    fn empty_source_is_reported_as_no_data() {
        let mut inputs = fixture();
        inputs[2] = ingest("DATE,MSPUS\n2020-01-01,.\n", SeriesId::Msp);
        let err = build_from_ingested(inputs, 0.2).unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert!(err.message().contains("MSPUS"));
    }

    #[test]
    fn rejects_out_of_range_down_payment() {
        assert_eq!(build_from_ingested(fixture(), 1.0).unwrap_err().exit_code(), 2);
        assert_eq!(build_from_ingested(fixture(), -0.1).unwrap_err().exit_code(), 2);
        assert!(validate_down_payment(0.0).is_ok());
    }
}
