//! Runtime layer for health-viz.
//!
//! Owns the session state between the data pipeline and the binary: the
//! active record source and its cached pipeline output.

pub mod data_manager;

pub use viz_core as core;
pub use viz_data as data;
