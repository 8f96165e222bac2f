//! Domain model and shared utilities for the health visualization pipeline.
//!
//! Holds the record types, error taxonomy, timestamp canonicalization,
//! sleep-night bucketing, quantile helpers, display formatting and the CLI
//! settings layer.

pub mod error;
pub mod formatting;
pub mod models;
pub mod quantile;
pub mod settings;
pub mod time_utils;

pub use error::{Result, VizError};
