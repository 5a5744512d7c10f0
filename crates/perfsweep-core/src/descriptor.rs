use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Counters measured when a descriptor does not name its own.
pub const DEFAULT_EVENTS: &[&str] = &["cpu-cycles", "instructions", "duration_time"];

/// Identity of one benchmark configuration.
///
/// Two descriptors are the same workload iff every field compares equal. The
/// value never changes after construction; the `with_*` methods return new
/// descriptors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "DescriptorFields")]
pub struct WorkloadDescriptor {
    real_min: f64,
    real_max: f64,
    imag_min: f64,
    imag_max: f64,
    image_width: u32,
    repeat: u32,
    threads: u32,
    region_label: String,
    events: Vec<String>,
}

impl WorkloadDescriptor {
    /// Create a descriptor measuring [`DEFAULT_EVENTS`].
    ///
    /// Without a `region_label` the label is the four bounds joined by
    /// underscores, e.g. `-2.5_1.5_-2.0_2.0`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        real_min: f64,
        real_max: f64,
        imag_min: f64,
        imag_max: f64,
        image_width: u32,
        repeat: u32,
        threads: u32,
        region_label: Option<String>,
    ) -> Self {
        let region_label = region_label.unwrap_or_else(|| {
            [real_min, real_max, imag_min, imag_max]
                .iter()
                .map(|bound| format_float(*bound))
                .collect::<Vec<_>>()
                .join("_")
        });

        Self {
            real_min,
            real_max,
            imag_min,
            imag_max,
            image_width,
            repeat,
            threads,
            region_label,
            events: DEFAULT_EVENTS.iter().map(|e| e.to_string()).collect(),
        }
    }

    /// Same workload, measuring `events` instead. Repeated names are dropped.
    pub fn with_events<I, S>(mut self, events: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for event in events {
            let event = event.into();
            if !unique.contains(&event) {
                unique.push(event);
            }
        }
        self.events = unique;
        self
    }

    /// Same workload, another degree of parallelism.
    pub fn with_threads(mut self, threads: u32) -> Self {
        self.threads = threads;
        self
    }

    /// Same workload, another image width.
    pub fn with_image_width(mut self, image_width: u32) -> Self {
        self.image_width = image_width;
        self
    }

    /// Check that the workload can be measured and persisted.
    ///
    /// Bounds must be finite, width, repeat and threads positive, and at
    /// least one event named.
    pub fn validate(&self) -> Result<()> {
        let bounds = [
            ("realMin", self.real_min),
            ("realMax", self.real_max),
            ("imagMin", self.imag_min),
            ("imagMax", self.imag_max),
        ];
        for (name, bound) in bounds {
            if !bound.is_finite() {
                return Err(Error::InvalidInput(format!("{} must be finite, got {}", name, bound)));
            }
        }

        let counts = [
            ("imageWidth", self.image_width),
            ("repeat", self.repeat),
            ("threads", self.threads),
        ];
        for (name, count) in counts {
            if count == 0 {
                return Err(Error::InvalidInput(format!("{} must be positive", name)));
            }
        }

        if self.events.is_empty() {
            return Err(Error::InvalidInput("no events to measure".to_string()));
        }
        Ok(())
    }

    /// Cache key: `<region_label>_<image_width>#<threads>`.
    ///
    /// Width and threads are part of the key so that one region measured at
    /// several resolutions or thread counts keeps one entry per point.
    pub fn to_key(&self) -> String {
        format!("{}_{}#{}", self.region_label, self.image_width, self.threads)
    }

    /// Positional arguments of the measured program, in order.
    pub fn program_args(&self) -> [String; 5] {
        [
            format_float(self.real_min),
            format_float(self.real_max),
            format_float(self.imag_min),
            format_float(self.imag_max),
            self.image_width.to_string(),
        ]
    }

    pub fn real_min(&self) -> f64 {
        self.real_min
    }

    pub fn real_max(&self) -> f64 {
        self.real_max
    }

    pub fn imag_min(&self) -> f64 {
        self.imag_min
    }

    pub fn imag_max(&self) -> f64 {
        self.imag_max
    }

    pub fn image_width(&self) -> u32 {
        self.image_width
    }

    pub fn repeat(&self) -> u32 {
        self.repeat
    }

    pub fn threads(&self) -> u32 {
        self.threads
    }

    pub fn region_label(&self) -> &str {
        &self.region_label
    }

    pub fn events(&self) -> &[String] {
        &self.events
    }
}

impl std::fmt::Display for WorkloadDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_key())
    }
}

/// Serialized form of a descriptor, checked before it becomes one.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DescriptorFields {
    real_min: f64,
    real_max: f64,
    imag_min: f64,
    imag_max: f64,
    image_width: u32,
    repeat: u32,
    threads: u32,
    region_label: String,
    events: Vec<String>,
}

impl TryFrom<DescriptorFields> for WorkloadDescriptor {
    type Error = Error;

    fn try_from(fields: DescriptorFields) -> Result<Self> {
        let descriptor = WorkloadDescriptor::new(
            fields.real_min,
            fields.real_max,
            fields.imag_min,
            fields.imag_max,
            fields.image_width,
            fields.repeat,
            fields.threads,
            Some(fields.region_label),
        )
        .with_events(fields.events);
        descriptor.validate()?;
        Ok(descriptor)
    }
}

// Debug formatting keeps the decimal point on integral values (`-2.0`, not `-2`).
fn format_float(value: f64) -> String {
    format!("{:?}", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_picture() -> WorkloadDescriptor {
        WorkloadDescriptor::new(-2.5, 1.5, -2.0, 2.0, 64, 10, 4, Some("full_picture".into()))
    }

    #[test]
    fn test_default_label_from_bounds() {
        let descriptor = WorkloadDescriptor::new(-2.5, 1.5, -2.0, 2.0, 16, 10, 1, None);
        assert_eq!(descriptor.region_label(), "-2.5_1.5_-2.0_2.0");
    }

    #[test]
    fn test_explicit_label_kept_verbatim() {
        let descriptor = WorkloadDescriptor::new(
            -0.75, -0.737, -0.132, -0.121, 256, 10, 1,
            Some("Seahorse Valley/zoom".into()),
        );
        assert_eq!(descriptor.region_label(), "Seahorse Valley/zoom");
    }

    #[test]
    fn test_default_events() {
        let descriptor = full_picture();
        assert_eq!(descriptor.events(), ["cpu-cycles", "instructions", "duration_time"]);
    }

    #[test]
    fn test_with_events_drops_duplicates() {
        let descriptor = full_picture().with_events(["instructions", "cycles", "instructions"]);
        assert_eq!(descriptor.events(), ["instructions", "cycles"]);
        // The shared default list is untouched.
        assert_eq!(full_picture().events().len(), DEFAULT_EVENTS.len());
    }

    #[test]
    fn test_key_format() {
        assert_eq!(full_picture().to_key(), "full_picture_64#4");
    }

    #[test]
    fn test_key_stable_and_distinct() {
        assert_eq!(full_picture().to_key(), full_picture().to_key());

        let mut keys = Vec::new();
        for width in [16, 32, 64] {
            for threads in [1, 2, 4] {
                keys.push(full_picture().with_image_width(width).with_threads(threads).to_key());
            }
        }
        let mut deduped = keys.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), keys.len());
    }

    #[test]
    fn test_key_ignores_bounds_and_repeat() {
        let other = WorkloadDescriptor::new(0.0, 1.0, 0.0, 1.0, 64, 3, 4, Some("full_picture".into()));
        assert_eq!(other.to_key(), full_picture().to_key());
        assert_ne!(other, full_picture());
    }

    #[test]
    fn test_structural_equality() {
        assert_eq!(full_picture(), full_picture());
        assert_ne!(full_picture(), full_picture().with_threads(8));
        assert_ne!(full_picture(), full_picture().with_events(["cpu-cycles"]));
    }

    #[test]
    fn test_program_args() {
        let descriptor = WorkloadDescriptor::new(-0.75, -0.737, -0.132, -0.121, 256, 10, 1, None);
        assert_eq!(
            descriptor.program_args(),
            ["-0.75", "-0.737", "-0.132", "-0.121", "256"].map(String::from)
        );
    }

    #[test]
    fn test_serde_uses_camel_case() {
        let json = serde_json::to_value(full_picture()).unwrap();
        assert_eq!(json["realMin"], -2.5);
        assert_eq!(json["imageWidth"], 64);
        assert_eq!(json["regionLabel"], "full_picture");

        let back: WorkloadDescriptor = serde_json::from_value(json).unwrap();
        assert_eq!(back, full_picture());
    }

    #[test]
    fn test_full_precision_bounds_survive_json() {
        let descriptor = WorkloadDescriptor::new(0.36035866877676836, 1.5, -2.0, 2.0, 64, 10, 4, None);
        let json = serde_json::to_string(&descriptor).unwrap();
        let back: WorkloadDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(back.real_min().to_bits(), descriptor.real_min().to_bits());
        assert_eq!(back, descriptor);
    }

    #[test]
    fn test_validate() {
        assert!(full_picture().validate().is_ok());
        assert!(matches!(full_picture().with_threads(0).validate(), Err(Error::InvalidInput(_))));
        assert!(matches!(full_picture().with_image_width(0).validate(), Err(Error::InvalidInput(_))));
        assert!(full_picture().with_events(Vec::<String>::new()).validate().is_err());

        let nan = WorkloadDescriptor::new(f64::NAN, 1.5, -2.0, 2.0, 64, 10, 4, Some("x".into()));
        assert!(matches!(nan.validate(), Err(Error::InvalidInput(_))));
        let inf = WorkloadDescriptor::new(-2.5, f64::INFINITY, -2.0, 2.0, 64, 10, 4, Some("x".into()));
        assert!(inf.validate().is_err());
    }

    #[test]
    fn test_deserialize_drops_duplicate_events() {
        let mut json = serde_json::to_value(full_picture()).unwrap();
        json["events"] = serde_json::json!(["cycles", "instructions", "cycles"]);

        let back: WorkloadDescriptor = serde_json::from_value(json).unwrap();
        assert_eq!(back.events(), ["cycles", "instructions"]);
    }

    #[test]
    fn test_deserialize_rejects_invalid_fields() {
        for (field, value) in [
            ("threads", serde_json::json!(0)),
            ("repeat", serde_json::json!(0)),
            ("imageWidth", serde_json::json!(0)),
            ("events", serde_json::json!([])),
        ] {
            let mut json = serde_json::to_value(full_picture()).unwrap();
            json[field] = value;
            let err = serde_json::from_value::<WorkloadDescriptor>(json).unwrap_err();
            assert!(err.to_string().contains("Invalid input"), "field {}: {}", field, err);
        }
    }
}
