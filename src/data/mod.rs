//! Data acquisition: FRED CSV sources (remote or local).

pub mod fred;

pub use fred::*;
