//! Runner trait and run output definitions.

use perfsweep_core::{MeasurementResult, Result, WorkloadDescriptor};
use std::path::PathBuf;

/// Result of one measured execution.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutput {
    /// Parsed harness records, in output order.
    pub results: Vec<MeasurementResult>,

    /// Where the measured program left its artifact.
    ///
    /// This is a fixed location owned by the runner; the caller is expected
    /// to move the file somewhere permanent before the next run overwrites it.
    pub artifact_path: PathBuf,
}

/// Trait defining the interface for measurement runners.
///
/// Runners are responsible for:
/// - Building the harness invocation for a workload
/// - Blocking until the measured program exits
/// - Turning the harness output into measurement results
pub trait Runner {
    /// Get the name of this runner.
    fn name(&self) -> &'static str;

    /// Measure one workload.
    ///
    /// # Returns
    /// The parsed results and the artifact location. A failed execution is
    /// returned as an error and never retried.
    fn run(&self, descriptor: &WorkloadDescriptor) -> Result<RunOutput>;
}
