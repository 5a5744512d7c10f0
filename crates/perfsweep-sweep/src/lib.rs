//! Sweep orchestration for perfsweep.
//!
//! This crate handles:
//! - Describing the parameter grid (thread counts, image widths, regions)
//! - Enumerating grid points in a deterministic order
//! - Resolving each point through the execution cache, one at a time

pub mod driver;
pub mod grid;

pub use driver::{SweepDriver, SweepSummary};
pub use grid::{Grid, RegionSpec, DEFAULT_REPEAT, EXPONENT_LIMIT};
