//! Run command: measure one workload through the cache.

use super::{bootstrap, create_cache};
use crate::GlobalArgs;
use anyhow::{Context, Result};
use perfsweep_core::WorkloadDescriptor;

/// Measure `descriptor` unless the cache already holds it, then print its results.
pub fn run(global: &GlobalArgs, descriptor: &WorkloadDescriptor, force: bool) -> Result<()> {
    bootstrap(global)?;
    let cache = create_cache(global);

    let record = cache
        .get_or_compute(descriptor, force)
        .with_context(|| format!("Failed to measure {}", descriptor))?;

    println!("Workload: {}", record.descriptor);
    println!("  Threads: {}", record.descriptor.threads());
    println!("  Image width: {}", record.descriptor.image_width());
    println!("  Samples: {}", record.descriptor.repeat());
    println!("  Artifact: {}", record.artifact_path.display());
    if let Some(instructions) = record.result_for("instructions") {
        println!("  IPC: {:.2}", instructions.metric_value);
    }
    println!();
    for result in &record.results {
        println!("{}", result);
    }

    let uncounted = record.results.iter().filter(|r| !r.is_counted()).count();
    if uncounted > 0 {
        println!();
        println!("{} event(s) could not be counted on this host", uncounted);
    }

    Ok(())
}
