//! Mathematical utilities: affordability formulas and descriptive statistics.

pub mod finance;
pub mod stats;

pub use finance::*;
pub use stats::*;
