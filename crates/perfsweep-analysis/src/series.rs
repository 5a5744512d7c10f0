use crate::dataset::DatasetRow;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Quantity plotted on the y axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Counter value of the `duration_time` event.
    Duration,
    /// Metric value (instructions per cycle) of the `instructions` event.
    Ipc,
}

impl Metric {
    fn event_prefix(self) -> &'static str {
        match self {
            Metric::Duration => "duration_time",
            Metric::Ipc => "instructions",
        }
    }

    fn value(self, row: &DatasetRow) -> Option<f64> {
        match self {
            Metric::Duration => row.counter_value,
            Metric::Ipc => Some(row.metric_value),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Metric::Duration => "Duration time",
            Metric::Ipc => "IPC",
        }
    }
}

/// Parameter on the x axis. The other parameter is held fixed per series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Threads,
    ImageWidth,
}

impl Axis {
    fn x(self, row: &DatasetRow) -> u32 {
        match self {
            Axis::Threads => row.threads,
            Axis::ImageWidth => row.image_width,
        }
    }

    fn fixed(self, row: &DatasetRow) -> u32 {
        match self {
            Axis::Threads => row.image_width,
            Axis::ImageWidth => row.threads,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Axis::Threads => "Threads",
            Axis::ImageWidth => "Image width",
        }
    }

    /// Name of the parameter held fixed.
    pub fn fixed_label(self) -> &'static str {
        match self {
            Axis::Threads => "image_width",
            Axis::ImageWidth => "threads",
        }
    }
}

/// The four chart families derived from a sweep.
pub const SERIES_KINDS: [(Metric, Axis); 4] = [
    (Metric::Duration, Axis::Threads),
    (Metric::Duration, Axis::ImageWidth),
    (Metric::Ipc, Axis::Threads),
    (Metric::Ipc, Axis::ImageWidth),
];

/// One chart's worth of data: a metric over one axis for a fixed region and
/// fixed value of the other parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub metric: Metric,
    pub axis: Axis,
    pub region_label: String,
    pub fixed: u32,
    /// `(x, y)` sorted by x; `y` is `None` when the counter was not available.
    pub points: Vec<(u32, Option<f64>)>,
}

impl Series {
    pub fn title(&self) -> String {
        format!(
            "{} x {} (region: {}, {}: {})",
            self.metric.label(),
            self.axis.label(),
            self.region_label,
            self.axis.fixed_label(),
            self.fixed
        )
    }
}

/// Group `rows` into series of `metric` over `axis`, ordered by region then
/// fixed parameter.
pub fn extract(rows: &[DatasetRow], metric: Metric, axis: Axis) -> Vec<Series> {
    let mut groups: BTreeMap<(String, u32), Vec<(u32, Option<f64>)>> = BTreeMap::new();
    for row in rows.iter().filter(|r| r.event.starts_with(metric.event_prefix())) {
        groups
            .entry((row.region_label.clone(), axis.fixed(row)))
            .or_default()
            .push((axis.x(row), metric.value(row)));
    }

    groups
        .into_iter()
        .map(|((region_label, fixed), mut points)| {
            points.sort_by_key(|(x, _)| *x);
            Series {
                metric,
                axis,
                region_label,
                fixed,
                points,
            }
        })
        .collect()
}
