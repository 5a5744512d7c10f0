use perfsweep_cache::{read_record, record_files};
use perfsweep_core::{ExecutionRecord, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One (workload, counter) pair, flattened for aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetRow {
    #[serde(rename = "input.real_min")]
    pub real_min: f64,
    #[serde(rename = "input.real_max")]
    pub real_max: f64,
    #[serde(rename = "input.imag_min")]
    pub imag_min: f64,
    #[serde(rename = "input.imag_max")]
    pub imag_max: f64,
    #[serde(rename = "input.image_width")]
    pub image_width: u32,
    #[serde(rename = "input.repeat")]
    pub repeat: u32,
    #[serde(rename = "input.threads")]
    pub threads: u32,
    #[serde(rename = "input.region_label")]
    pub region_label: String,
    #[serde(rename = "result.counter_value")]
    pub counter_value: Option<f64>,
    #[serde(rename = "result.event")]
    pub event: String,
    #[serde(rename = "result.metric_unit")]
    pub metric_unit: String,
    #[serde(rename = "result.metric_value")]
    pub metric_value: f64,
    #[serde(rename = "result.variance")]
    pub variance_percent: f64,
    #[serde(rename = "result.unit")]
    pub unit: String,
}

/// Every execution record persisted in a cache directory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<ExecutionRecord>,
}

impl Dataset {
    pub fn new(records: Vec<ExecutionRecord>) -> Self {
        Self { records }
    }

    /// Read every record file in `dir`.
    ///
    /// Only the cache file schema is consulted; a record is loaded whether or
    /// not its artifact is still present.
    pub fn load(dir: &Path) -> Result<Self> {
        let mut records = Vec::new();
        for path in record_files(dir)? {
            tracing::debug!(path = %path.display(), "loading record");
            records.push(read_record(&path)?);
        }
        tracing::info!(count = records.len(), dir = %dir.display(), "loaded dataset");
        Ok(Self { records })
    }

    pub fn records(&self) -> &[ExecutionRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// One row per (record, result).
    pub fn rows(&self) -> Vec<DatasetRow> {
        self.records
            .iter()
            .flat_map(|record| {
                let d = &record.descriptor;
                record.results.iter().map(move |r| DatasetRow {
                    real_min: d.real_min(),
                    real_max: d.real_max(),
                    imag_min: d.imag_min(),
                    imag_max: d.imag_max(),
                    image_width: d.image_width(),
                    repeat: d.repeat(),
                    threads: d.threads(),
                    region_label: d.region_label().to_string(),
                    counter_value: r.counter_value,
                    event: r.event.clone(),
                    metric_unit: r.metric_unit.clone(),
                    metric_value: r.metric_value,
                    variance_percent: r.variance_percent,
                    unit: r.unit.clone(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use perfsweep_core::{MeasurementResult, WorkloadDescriptor};
    use std::fs;
    use std::path::PathBuf;

    fn result(event: &str, counter: Option<f64>, metric: f64) -> MeasurementResult {
        MeasurementResult {
            counter_value: counter,
            event: event.to_string(),
            metric_unit: "".to_string(),
            metric_value: metric,
            variance_percent: 0.1,
            unit: "".to_string(),
        }
    }

    fn record(threads: u32) -> ExecutionRecord {
        ExecutionRecord::new(
            WorkloadDescriptor::new(-2.5, 1.5, -2.0, 2.0, 32, 10, threads, Some("full_picture".into())),
            vec![
                result("instructions:u", Some(100.0), 1.5),
                result("duration_time:u", None, 0.0),
            ],
            PathBuf::from(format!("full_picture_32#{}.ppm", threads)),
        )
    }

    #[test]
    fn test_rows_flatten_records() {
        let dataset = Dataset::new(vec![record(1), record(2)]);
        let rows = dataset.rows();

        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].threads, 1);
        assert_eq!(rows[0].event, "instructions:u");
        assert_eq!(rows[1].counter_value, None);
        assert_eq!(rows[3].threads, 2);
        assert_eq!(rows[3].region_label, "full_picture");
    }

    #[test]
    fn test_row_column_names() {
        let rows = Dataset::new(vec![record(1)]).rows();
        let json = serde_json::to_value(&rows[0]).unwrap();
        assert_eq!(json["input.image_width"], 32);
        assert_eq!(json["result.metric_value"], 1.5);
    }

    #[test]
    fn test_load_reads_cache_files() {
        let dir = tempfile::tempdir().unwrap();
        let body = serde_json::json!({
            "input": {
                "realMin": -2.5, "realMax": 1.5, "imagMin": -2.0, "imagMax": 2.0,
                "imageWidth": 32, "repeat": 10, "threads": 4,
                "regionLabel": "full_picture",
                "events": ["cpu-cycles", "instructions", "duration_time"]
            },
            "results": [
                {"counterValue": 12.5, "event": "duration_time:u", "metricUnit": "",
                 "metricValue": 0.0, "variance": 2.0, "unit": "ns"}
            ]
        });
        fs::write(dir.path().join("full_picture_32#4.json"), body.to_string()).unwrap();
        fs::write(dir.path().join("full_picture_32#4.ppm"), "P3").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let dataset = Dataset::load(dir.path()).unwrap();
        assert_eq!(dataset.records().len(), 1);
        let record = &dataset.records()[0];
        assert_eq!(record.descriptor.threads(), 4);
        assert_eq!(record.artifact_path, dir.path().join("full_picture_32#4.ppm"));
        assert_eq!(dataset.rows()[0].counter_value, Some(12.5));
    }

    #[test]
    fn test_load_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Dataset::load(&dir.path().join("absent")).unwrap().is_empty());
    }

    #[test]
    fn test_load_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("broken.json"), "{}").unwrap();
        assert!(Dataset::load(dir.path()).is_err());
    }
}
