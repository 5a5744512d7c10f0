//! Measurement runners for perfsweep.
//!
//! This crate defines the `Runner` trait that executes one workload and
//! returns its parsed counters, along with the `perf stat` implementation.

pub mod perf;
pub mod runner;

pub use perf::{PerfRunner, RunnerConfig, DEFAULT_ARTIFACT, DEFAULT_HARNESS, DEFAULT_THREADS_ENV};
pub use runner::{RunOutput, Runner};
