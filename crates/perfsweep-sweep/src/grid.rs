use perfsweep_core::{Error, Result, WorkloadDescriptor};
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::path::Path;

/// Samples taken by the harness for each grid point.
pub const DEFAULT_REPEAT: u32 = 10;

/// Exclusive upper bound of exponent ranges; `1 << 31` is the largest `u32` power of two.
pub const EXPONENT_LIMIT: u32 = 32;

/// A named viewport of the complex plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionSpec {
    pub label: String,
    pub real_min: f64,
    pub real_max: f64,
    pub imag_min: f64,
    pub imag_max: f64,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

fn default_repeat() -> u32 {
    DEFAULT_REPEAT
}

impl RegionSpec {
    pub fn new(label: &str, real_min: f64, real_max: f64, imag_min: f64, imag_max: f64) -> Self {
        Self {
            label: label.to_string(),
            real_min,
            real_max,
            imag_min,
            imag_max,
            repeat: DEFAULT_REPEAT,
        }
    }

    /// The whole set.
    pub fn full_picture() -> Self {
        Self::new("full_picture", -2.5, 1.5, -2.0, 2.0)
    }

    pub fn seahorse_valley() -> Self {
        Self::new("seahorse_valley", -0.75, -0.737, -0.132, -0.121)
    }

    pub fn elephant_valley() -> Self {
        Self::new("elephant_valley", 0.175, 0.375, -0.1, 0.1)
    }

    pub fn triple_spiral_valley() -> Self {
        Self::new("triple_spiral_valley", -0.188, -0.012, 0.554, 0.754)
    }

    /// Descriptor for this region at one grid point.
    pub fn descriptor(&self, image_width: u32, threads: u32) -> WorkloadDescriptor {
        WorkloadDescriptor::new(
            self.real_min,
            self.real_max,
            self.imag_min,
            self.imag_max,
            image_width,
            self.repeat,
            threads,
            Some(self.label.clone()),
        )
    }
}

/// The parameter space of a sweep.
///
/// Thread counts and image widths are consecutive powers of two over
/// half-open exponent ranges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    pub thread_exponents: Range<u32>,
    pub width_exponents: Range<u32>,
    pub regions: Vec<RegionSpec>,
    /// Counters to measure; the descriptor default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<String>>,
}

impl Default for Grid {
    fn default() -> Self {
        Self::standard()
    }
}

impl Grid {
    /// 1..=256 threads, 16..=8192 pixel widths, the four standard regions.
    pub fn standard() -> Self {
        Self {
            thread_exponents: 0..9,
            width_exponents: 4..14,
            regions: vec![
                RegionSpec::full_picture(),
                RegionSpec::seahorse_valley(),
                RegionSpec::elephant_valley(),
                RegionSpec::triple_spiral_valley(),
            ],
            events: None,
        }
    }

    /// Load a grid from a JSON file and validate it.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let grid: Self = serde_json::from_str(&content)?;
        grid.validate()?;
        Ok(grid)
    }

    /// Check that every exponent yields a `u32` and every point is measurable.
    pub fn validate(&self) -> Result<()> {
        for (name, exponents) in [
            ("thread_exponents", &self.thread_exponents),
            ("width_exponents", &self.width_exponents),
        ] {
            if exponents.end > EXPONENT_LIMIT {
                return Err(Error::InvalidInput(format!(
                    "{} {:?} exceeds {}",
                    name, exponents, EXPONENT_LIMIT
                )));
            }
        }

        for region in &self.regions {
            let descriptor = region.descriptor(1, 1);
            let descriptor = match &self.events {
                Some(events) => descriptor.with_events(events.iter().cloned()),
                None => descriptor,
            };
            descriptor
                .validate()
                .map_err(|e| Error::InvalidInput(format!("region `{}`: {}", region.label, e)))?;
        }
        Ok(())
    }

    pub fn with_thread_exponents(mut self, exponents: Range<u32>) -> Self {
        self.thread_exponents = exponents;
        self
    }

    pub fn with_width_exponents(mut self, exponents: Range<u32>) -> Self {
        self.width_exponents = exponents;
        self
    }

    pub fn with_events(mut self, events: Vec<String>) -> Self {
        self.events = Some(events);
        self
    }

    /// Exponents at or past [`EXPONENT_LIMIT`] are skipped; [`Grid::validate`] rejects them.
    pub fn thread_counts(&self) -> Vec<u32> {
        powers_of_two(&self.thread_exponents)
    }

    pub fn image_widths(&self) -> Vec<u32> {
        powers_of_two(&self.width_exponents)
    }

    /// Number of grid points.
    pub fn len(&self) -> usize {
        self.thread_exponents.len() * self.width_exponents.len() * self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every grid point, threads outermost, then widths, then regions.
    pub fn descriptors(&self) -> Vec<WorkloadDescriptor> {
        let mut descriptors = Vec::with_capacity(self.len());
        for threads in self.thread_counts() {
            for width in self.image_widths() {
                for region in &self.regions {
                    let descriptor = region.descriptor(width, threads);
                    descriptors.push(match &self.events {
                        Some(events) => descriptor.with_events(events.iter().cloned()),
                        None => descriptor,
                    });
                }
            }
        }
        descriptors
    }
}

fn powers_of_two(exponents: &Range<u32>) -> Vec<u32> {
    exponents.clone().filter_map(|e| 1u32.checked_shl(e)).collect()
}
