//! Reporting over the perfsweep cache directory.
//!
//! This crate provides:
//! - Loading every persisted execution record
//! - Flattening records into one row per (workload, counter)
//! - Duration and IPC series for charting, as text or JSON reports

pub mod dataset;
pub mod report;
pub mod series;

pub use dataset::{Dataset, DatasetRow};
pub use report::Report;
pub use series::{extract, Axis, Metric, Series, SERIES_KINDS};
