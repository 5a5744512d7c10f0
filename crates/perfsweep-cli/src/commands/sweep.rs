//! Sweep command: measure every point of the grid.

use super::{bootstrap, create_cache};
use crate::GlobalArgs;
use anyhow::{Context, Result};
use perfsweep_sweep::{Grid, SweepDriver};
use std::ops::Range;
use std::path::Path;

/// Resolve every grid point, measuring only the ones not yet cached.
pub fn sweep(
    global: &GlobalArgs,
    force: bool,
    grid_path: Option<&Path>,
    threads_exp: Option<Range<u32>>,
    width_exp: Option<Range<u32>>,
) -> Result<()> {
    bootstrap(global)?;

    let mut grid = match grid_path {
        Some(path) => Grid::from_file(path)
            .with_context(|| format!("Failed to load grid from {}", path.display()))?,
        None => Grid::standard(),
    };
    if let Some(exponents) = threads_exp {
        grid = grid.with_thread_exponents(exponents);
    }
    if let Some(exponents) = width_exp {
        grid = grid.with_width_exponents(exponents);
    }

    let cache = create_cache(global);
    let summary = SweepDriver::new(&cache, grid).run(force)?;

    println!(
        "Sweep complete: {} point(s), {} measured, {} from cache",
        summary.total(),
        summary.measured,
        summary.cached
    );
    Ok(())
}
