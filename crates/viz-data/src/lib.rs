//! Loading, normalization and aggregation of health export records.
//!
//! The pipeline runs reader → normalizer → aggregator / one-night view, with
//! [`source::RecordSource`] choosing between file exports and seeded
//! synthetic data.

pub mod aggregator;
pub mod feather;
pub mod normalizer;
pub mod one_night;
pub mod reader;
pub mod source;
pub mod synthetic;
