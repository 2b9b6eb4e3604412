//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - record exports to CSV (`export`)
//! - dataset JSON read/write (`dataset`)

pub mod dataset;
pub mod export;
pub mod ingest;

pub use dataset::*;
pub use export::*;
pub use ingest::*;
