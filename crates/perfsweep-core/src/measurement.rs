use crate::descriptor::WorkloadDescriptor;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// One counter reported by the harness for a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementResult {
    /// `None` when the harness could not count the event on this host.
    pub counter_value: Option<f64>,
    pub event: String,
    pub metric_unit: String,
    /// Derived metric, e.g. instructions per cycle.
    pub metric_value: f64,
    #[serde(rename = "variance")]
    pub variance_percent: f64,
    /// Unit of the raw counter.
    pub unit: String,
}

impl MeasurementResult {
    pub fn is_counted(&self) -> bool {
        self.counter_value.is_some()
    }
}

impl fmt::Display for MeasurementResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counter = self
            .counter_value
            .map(|value| value.to_string())
            .unwrap_or_default();
        write!(
            f,
            "{:>12} {:>4} {:>20} # {:>3.2} ± {:>3.2}% {}",
            counter, self.unit, self.event, self.metric_value, self.variance_percent, self.metric_unit
        )
    }
}

/// A workload, its measurements and the artifact the run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionRecord {
    pub descriptor: WorkloadDescriptor,
    /// In harness output order.
    pub results: Vec<MeasurementResult>,
    pub artifact_path: PathBuf,
}

impl ExecutionRecord {
    pub fn new(
        descriptor: WorkloadDescriptor,
        results: Vec<MeasurementResult>,
        artifact_path: PathBuf,
    ) -> Self {
        Self {
            descriptor,
            results,
            artifact_path,
        }
    }

    /// First result whose event name starts with `prefix`.
    ///
    /// The harness may decorate event names with modifiers (`instructions:u`),
    /// so lookups match on the prefix.
    pub fn result_for(&self, prefix: &str) -> Option<&MeasurementResult> {
        self.results.iter().find(|r| r.event.starts_with(prefix))
    }
}
