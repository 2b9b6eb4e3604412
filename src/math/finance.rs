//! Affordability formulas.
//!
//! All functions are plain IEEE-754 arithmetic with no special casing, so edge
//! inputs (zero rate, zero CPI) surface as `NaN`/`inf` instead of being hidden.

use crate::domain::TERM_MONTHS;

/// Fixed-rate amortized monthly payment on a 30-year loan.
///
/// - `P = price * (1 - down_payment)`
/// - `I = annual_rate / 12`
/// - `T = (1 + I)^360`
/// - `payment = P * I * T / (T - 1)`
///
/// At `annual_rate == 0` this is `0 / 0 = NaN`.
pub fn monthly_payment(price: f64, annual_rate: f64, down_payment: f64) -> f64 {
    let principal = price * (1.0 - down_payment);
    let i = annual_rate / 12.0;
    let t = (1.0 + i).powi(TERM_MONTHS);
    principal * (i * t) / (t - 1.0)
}

/// Express `value` in the purchasing power of `reference_cpi`.
///
/// The CPI ratio is taken first so a quarter priced at the reference CPI maps
/// to itself bit-for-bit.
pub fn inflation_adjusted(value: f64, period_cpi: f64, reference_cpi: f64) -> f64 {
    value * (reference_cpi / period_cpi)
}

/// Relative change against the value `lag` positions earlier.
///
/// The first `lag` entries are `None`.
pub fn year_over_year(values: &[f64], lag: usize) -> Vec<Option<f64>> {
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            if lag == 0 || i < lag {
                None
            } else {
                Some(v / values[i - lag] - 1.0)
            }
        })
        .collect()
}
