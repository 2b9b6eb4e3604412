//! Small descriptive statistics over merged columns.

/// Pearson correlation of paired samples.
///
/// Pairs where either side is non-finite are ignored. Returns `None` with fewer
/// than two usable pairs or when either side has zero variance.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .map(|(&x, &y)| (x, y))
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect();

    if pairs.len() < 2 {
        return None;
    }

    // Centered sums keep constant columns at exactly zero variance.
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    let denominator = (sxx * syy).sqrt();
    if denominator == 0.0 || !denominator.is_finite() {
        None
    } else {
        Some(sxy / denominator)
    }
}

/// Min/max of the finite values, padded by `frac` of the span on both sides.
///
/// With `floor_at_zero`, the lower bound is clamped to at most zero.
pub fn value_extent(values: &[f64], frac: f64, floor_at_zero: bool) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &v in values.iter().filter(|v| v.is_finite()) {
        min = min.min(v);
        max = max.max(v);
    }
    if !(min.is_finite() && max.is_finite()) {
        return None;
    }

    let pad = (max - min) * frac;
    let mut lo = min - pad;
    if floor_at_zero {
        lo = lo.min(0.0);
    }
    Some((lo, max + pad))
}

/// Index of the largest finite value (first one on ties).
pub fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        if !v.is_finite() {
            continue;
        }
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// Index of the smallest finite value (first one on ties).
pub fn argmin(values: &[f64]) -> Option<usize> {
    let negated: Vec<f64> = values.iter().map(|v| -v).collect();
    argmax(&negated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pearson_detects_perfect_relationships() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let up = [2.0, 4.0, 6.0, 8.0];
        let down = [8.0, 6.0, 4.0, 2.0];
        assert!((pearson(&x, &up).unwrap() - 1.0).abs() < 1e-12);
        assert!((pearson(&x, &down).unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn pearson_skips_nan_pairs_and_flat_inputs() {
        let x = [1.0, 2.0, f64::NAN, 3.0];
        let y = [1.0, 2.0, 100.0, 3.0];
        assert!((pearson(&x, &y).unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]), None);
        assert_eq!(pearson(&[1.0], &[1.0]), None);
    }

    #[test]
    fn extent_pads_four_percent() {
        let (lo, hi) = value_extent(&[100.0, 200.0], 0.04, false).unwrap();
        assert!((lo - 96.0).abs() < 1e-12);
        assert!((hi - 204.0).abs() < 1e-12);
        let (lo, _) = value_extent(&[100.0, 200.0], 0.04, true).unwrap();
        assert_eq!(lo, 0.0);
        assert_eq!(value_extent(&[f64::NAN], 0.04, false), None);
    }

    #[test]
    fn argmax_and_argmin_ignore_non_finite() {
        let v = [3.0, f64::NAN, 9.0, 9.0, f64::INFINITY, -1.0];
        assert_eq!(argmax(&v), Some(2));
        assert_eq!(argmin(&v), Some(5));
        assert_eq!(argmax(&[]), None);
    }
}
