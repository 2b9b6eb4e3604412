//! Coarsest-granularity, period-average join across several series.
//!
//! Every input is already bucketed to quarters, but sampled at its own native
//! frequency (weekly, monthly, quarterly) and over its own date range. The merge
//! walks all inputs forward in one pass:
//!
//! 1. the frontier is the latest period any cursor currently points at
//! 2. cursors behind the frontier skip forward (those samples are dropped)
//! 3. if an input has no sample at the frontier, the frontier moves on
//! 4. otherwise every cursor averages its samples at the frontier and one row
//!    is emitted
//!
//! The pass stops as soon as any input is exhausted, so the output only covers
//! periods where every input has data.

use tracing::{debug, trace};

use crate::align::AlignError;
use crate::domain::{Period, Sample, Series};

/// One merged period: the average value of each input, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedRow {
    pub period: Period,
    pub values: Vec<f64>,
}

/// Merge output.
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment {
    pub rows: Vec<AlignedRow>,
    /// Samples skipped per input because they fell behind the frontier.
    pub dropped: Vec<usize>,
}

/// Read state for one input series.
#[derive(Debug)]
struct Cursor<'a> {
    samples: &'a [Sample],
    position: usize,
    dropped: usize,
}

impl<'a> Cursor<'a> {
    fn new(samples: &'a [Sample]) -> Self {
        Self {
            samples,
            position: 0,
            dropped: 0,
        }
    }

    fn current_period(&self) -> Option<Period> {
        self.samples.get(self.position).map(|s| s.period)
    }

    fn done(&self) -> bool {
        self.position >= self.samples.len()
    }

    /// Skip samples strictly before `target`.
    fn skip_before(&mut self, target: Period) {
        while let Some(period) = self.current_period() {
            if period >= target {
                break;
            }
            self.position += 1;
            self.dropped += 1;
        }
    }

    /// Consume every sample at `target` and return their mean.
    ///
    /// Returns `None` if the cursor has nothing at `target`.
    fn consume_average(&mut self, target: Period) -> Option<f64> {
        let mut sum = 0.0;
        let mut count = 0usize;
        while let Some(sample) = self.samples.get(self.position) {
            if sample.period != target {
                break;
            }
            sum += sample.value;
            count += 1;
            self.position += 1;
        }
        (count > 0).then(|| sum / count as f64)
    }
}

/// Align `series` onto their common quarterly window.
///
/// Output periods are strictly increasing and lie inside the intersection of
/// every input's period range; the row count never exceeds the shortest input.
pub fn align_series(series: &[&Series]) -> Result<Alignment, AlignError> {
    if series.is_empty() {
        return Err(AlignError::NoSeries);
    }
    if let Some(empty) = series.iter().find(|s| s.is_empty()) {
        return Err(AlignError::EmptySeries(empty.id.code().to_string()));
    }

    let mut cursors: Vec<Cursor<'_>> = series.iter().map(|s| Cursor::new(&s.samples)).collect();
    let mut rows = Vec::new();

    'merge: while cursors.iter().all(|c| !c.done()) {
        let Some(target) = cursors.iter().filter_map(Cursor::current_period).max() else {
            break;
        };

        for cursor in cursors.iter_mut() {
            cursor.skip_before(target);
        }
        if cursors.iter().any(Cursor::done) {
            trace!(period = %target, "input exhausted while catching up to frontier");
            break;
        }

        // A cursor with a gap at `target` already sits past it; advance the frontier.
        if cursors.iter().any(|c| c.current_period() != Some(target)) {
            trace!(period = %target, "quarter missing from an input, moving frontier");
            continue;
        }

        let mut values = Vec::with_capacity(cursors.len());
        for cursor in cursors.iter_mut() {
            match cursor.consume_average(target) {
                Some(avg) => values.push(avg),
                None => break 'merge,
            }
        }

        rows.push(AlignedRow {
            period: target,
            values,
        });
    }

    if rows.is_empty() {
        return Err(AlignError::NoOverlapWindow);
    }

    let dropped: Vec<usize> = cursors.iter().map(|c| c.dropped).collect();
    debug!(
        rows = rows.len(),
        first = %rows[0].period,
        last = %rows[rows.len() - 1].period,
        ?dropped,
        "merged series"
    );

    Ok(Alignment { rows, dropped })
}
