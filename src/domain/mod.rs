//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - calendar quarters (`Period`)
//! - raw inputs (`SeriesId`, `Sample`, `Series`, `SourceSpec`)
//! - merged outputs (`HousingRecord`, `Dataset`) and run configuration

pub mod period;
pub mod types;

pub use period::*;
pub use types::*;
