//! Time-series alignment and derived fields.
//!
//! Responsibilities:
//!
//! - merge independently sampled series onto their common quarters (`merge`)
//! - compute YoY, inflation-adjusted and payment fields (`derive`)

use thiserror::Error;

pub mod derive;
pub mod merge;

pub use derive::*;
pub use merge::*;

/// Why a merge could not produce any data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlignError {
    #[error("No input series to merge.")]
    NoSeries,

    #[error("Series {0} has no usable observations.")]
    EmptySeries(String),

    #[error("The input series share no common quarter.")]
    NoOverlapWindow,
}
