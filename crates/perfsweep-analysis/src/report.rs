use crate::dataset::Dataset;
use crate::series::{extract, Series, SERIES_KINDS};
use perfsweep_core::Result;
use std::fmt::Write;

/// Generates human-readable and machine-readable reports.
pub struct Report {
    series: Vec<Series>,
    records: usize,
}

impl Report {
    pub fn new(dataset: &Dataset) -> Self {
        let rows = dataset.rows();
        let series = SERIES_KINDS
            .iter()
            .flat_map(|(metric, axis)| extract(&rows, *metric, *axis))
            .collect();
        Self {
            series,
            records: dataset.records().len(),
        }
    }

    pub fn series(&self) -> &[Series] {
        &self.series
    }

    /// Generate a human-readable text report, one table per series.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{} execution record(s)", self.records);

        for series in &self.series {
            let _ = writeln!(out);
            let _ = writeln!(out, "{}", series.title());
            let _ = writeln!(out, "  {:>12}  {:>16}", series.axis.label(), series.metric.label());
            for (x, y) in &series.points {
                let y = match y {
                    Some(value) => format!("{:.4}", value),
                    None => "not counted".to_string(),
                };
                let _ = writeln!(out, "  {:>12}  {:>16}", x, y);
            }
        }
        out
    }

    /// Generate a JSON report.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.series)?)
    }
}
