use crate::grid::Grid;
use perfsweep_cache::{ExecutionCache, Source};
use perfsweep_core::Result;

/// Walks a [`Grid`] and resolves every point through the execution cache.
///
/// Points are measured strictly one after another; two measured programs
/// never overlap.
pub struct SweepDriver<'a> {
    cache: &'a ExecutionCache,
    grid: Grid,
}

impl<'a> SweepDriver<'a> {
    pub fn new(cache: &'a ExecutionCache, grid: Grid) -> Self {
        Self { cache, grid }
    }

    /// Resolve every grid point. The first failure aborts the sweep; an
    /// invalid grid is rejected before anything runs.
    pub fn run(&self, force_recompute: bool) -> Result<SweepSummary> {
        self.grid.validate()?;
        let descriptors = self.grid.descriptors();
        let total = descriptors.len();
        let mut summary = SweepSummary::default();

        tracing::info!(total, force_recompute, "starting sweep");
        for (index, descriptor) in descriptors.iter().enumerate() {
            tracing::info!("[{}/{}] {}", index + 1, total, descriptor);
            let resolved = self.cache.resolve(descriptor, force_recompute)?;
            match resolved.source {
                Source::Cache => summary.cached += 1,
                Source::Fresh => summary.measured += 1,
            }
        }
        tracing::info!(measured = summary.measured, cached = summary.cached, "sweep complete");

        Ok(summary)
    }
}

/// Outcome counts of a sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepSummary {
    /// Points answered from the cache.
    pub cached: usize,
    /// Points the runner had to measure.
    pub measured: usize,
}

impl SweepSummary {
    pub fn total(&self) -> usize {
        self.cached + self.measured
    }
}
