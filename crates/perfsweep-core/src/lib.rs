//! Core types for perfsweep.
//!
//! This crate defines the measurement identity model shared by the whole
//! workspace: workload descriptors, parsed counter results, execution records,
//! the harness output parser and the error type.

pub mod descriptor;
pub mod error;
pub mod measurement;
pub mod parser;

pub use descriptor::{WorkloadDescriptor, DEFAULT_EVENTS};
pub use error::{Error, Result};
pub use measurement::{ExecutionRecord, MeasurementResult};
