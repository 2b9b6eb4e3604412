//! `housing-series` library crate.
//!
//! Aligns CPI, median house sales price and the 30-year mortgage rate onto
//! calendar quarters and derives inflation-adjusted prices and payments.
//!
//! The binary (`hs`) is a thin wrapper around this library so that the
//! ingest, merge and derivation steps are testable without spawning processes.

pub mod align;
pub mod app;
pub mod cli;
pub mod data;
pub mod debug;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod report;
