//! Decoding of the harness's machine-readable output.
//!
//! `perf stat -j` writes one JSON object per counter on its diagnostic
//! stream. Some locales render decimals with a comma (`1234,56`), which is
//! rewritten to a period before decoding.

use crate::measurement::MeasurementResult;
use crate::{Error, Result};
use serde::Deserialize;
use std::borrow::Cow;

/// Counter value reported when the event could not be counted.
pub const NOT_COUNTED: &str = "<not counted>";

/// Counter value reported when the event does not exist on the host.
pub const NOT_SUPPORTED: &str = "<not supported>";

/// A numeric field as the harness prints it: a JSON number or a quoted one.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Number(f64),
    Text(String),
}

impl RawNumber {
    /// Finite value of the field. NaN and infinities cannot be persisted.
    fn to_f64(&self, field: &str) -> std::result::Result<f64, String> {
        let value = match self {
            RawNumber::Number(value) => *value,
            RawNumber::Text(text) => text
                .trim()
                .parse()
                .map_err(|_| format!("field `{}` is not a number: {:?}", field, text))?,
        };
        if !value.is_finite() {
            return Err(format!("field `{}` is not finite: {}", field, value));
        }
        Ok(value)
    }
}

/// Wire schema of one harness record.
#[derive(Debug, Deserialize)]
struct HarnessRecord {
    #[serde(rename = "counter-value")]
    counter_value: RawNumber,
    event: String,
    #[serde(rename = "metric-unit")]
    metric_unit: String,
    #[serde(rename = "metric-value")]
    metric_value: RawNumber,
    variance: RawNumber,
    unit: String,
}

/// Rewrite every comma that sits between two digits into a period.
///
/// Other commas, including JSON field separators, are left alone.
pub fn normalize_decimal_commas(line: &str) -> Cow<'_, str> {
    let bytes = line.as_bytes();
    let is_decimal_comma = |i: usize| {
        bytes[i] == b','
            && i > 0
            && i + 1 < bytes.len()
            && bytes[i - 1].is_ascii_digit()
            && bytes[i + 1].is_ascii_digit()
    };

    if !(0..bytes.len()).any(is_decimal_comma) {
        return Cow::Borrowed(line);
    }

    // Only ASCII bytes are replaced, so the result stays valid UTF-8.
    let normalized: Vec<u8> = (0..bytes.len())
        .map(|i| if is_decimal_comma(i) { b'.' } else { bytes[i] })
        .collect();
    Cow::Owned(String::from_utf8_lossy(&normalized).into_owned())
}

/// Parse one harness record into a [`MeasurementResult`].
///
/// A counter the harness could not measure becomes `counter_value: None`
/// and is reported as a warning, not an error.
pub fn parse_record(line: &str) -> Result<MeasurementResult> {
    let normalized = normalize_decimal_commas(line);
    let parse_error = |reason: String| Error::Parse {
        line: line.to_string(),
        reason,
    };

    let record: HarnessRecord =
        serde_json::from_str(&normalized).map_err(|e| parse_error(e.to_string()))?;

    let counter_value = match &record.counter_value {
        RawNumber::Text(text) if text == NOT_COUNTED || text == NOT_SUPPORTED => {
            tracing::warn!(event = %record.event, value = %text, "counter not available");
            None
        }
        raw => Some(raw.to_f64("counter-value").map_err(parse_error)?),
    };

    Ok(MeasurementResult {
        counter_value,
        metric_value: record.metric_value.to_f64("metric-value").map_err(parse_error)?,
        variance_percent: record.variance.to_f64("variance").map_err(parse_error)?,
        event: record.event,
        metric_unit: record.metric_unit,
        unit: record.unit,
    })
}

/// Parse every non-blank line of harness output. The first bad line aborts.
pub fn parse_output(output: &str) -> Result<Vec<MeasurementResult>> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse_record)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(counter: &str) -> String {
        format!(
            r#"{{"counter-value" : {}, "unit" : "msec", "event" : "task-clock", "event-runtime" : 1234, "pcnt-running" : 100.00, "metric-value" : "0.998", "metric-unit" : "CPUs utilized", "variance" : 0.42}}"#,
            counter
        )
    }

    #[test]
    fn test_normalize_comma_between_digits() {
        assert_eq!(normalize_decimal_commas("1234,56"), "1234.56");
        assert_eq!(normalize_decimal_commas(r#"{"a" : "1,5", "b" : 2}"#), r#"{"a" : "1.5", "b" : 2}"#);
    }

    #[test]
    fn test_normalize_leaves_separators() {
        let line = r#"{"a" : "x", "b" : 2, "c" : [1, 2]}"#;
        assert!(matches!(normalize_decimal_commas(line), Cow::Borrowed(_)));
        assert_eq!(normalize_decimal_commas(",1,"), ",1,");
    }

    #[test]
    fn test_parse_quoted_numbers() {
        let result = parse_record(&record(r#""1234.56""#)).unwrap();
        assert_eq!(result.counter_value, Some(1234.56));
        assert_eq!(result.event, "task-clock");
        assert_eq!(result.unit, "msec");
        assert_eq!(result.metric_unit, "CPUs utilized");
        assert_eq!(result.metric_value, 0.998);
        assert_eq!(result.variance_percent, 0.42);
    }

    #[test]
    fn test_parse_locale_comma() {
        let result = parse_record(&record(r#""1234,56""#)).unwrap();
        assert_eq!(result.counter_value, Some(1234.56));
    }

    #[test]
    fn test_parse_bare_number() {
        let result = parse_record(&record("42")).unwrap();
        assert_eq!(result.counter_value, Some(42.0));
    }

    #[test]
    fn test_parse_not_counted() {
        let result = parse_record(&record(r#""<not counted>""#)).unwrap();
        assert_eq!(result.counter_value, None);

        let result = parse_record(&record(r#""<not supported>""#)).unwrap();
        assert_eq!(result.counter_value, None);
    }

    #[test]
    fn test_parse_missing_field() {
        let line = r#"{"counter-value" : "1", "event" : "cycles", "metric-unit" : "", "metric-value" : 0, "unit" : ""}"#;
        match parse_record(line) {
            Err(Error::Parse { line: bad, reason }) => {
                assert_eq!(bad, line);
                assert!(reason.contains("variance"));
            }
            other => panic!("Expected Parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_malformed() {
        assert!(matches!(parse_record("Performance counter stats"), Err(Error::Parse { .. })));
        assert!(matches!(parse_record(&record(r#""lots""#)), Err(Error::Parse { .. })));
    }

    #[test]
    fn test_parse_rejects_non_finite() {
        for counter in [r#""nan""#, r#""inf""#, r#""-infinity""#, r#""1e999""#] {
            assert!(
                matches!(parse_record(&record(counter)), Err(Error::Parse { .. })),
                "counter {}",
                counter
            );
        }

        let line = r#"{"counter-value" : "12", "unit" : "", "event" : "cycles", "metric-value" : "nan", "metric-unit" : "", "variance" : "nan"}"#;
        match parse_record(line) {
            Err(Error::Parse { reason, .. }) => assert!(reason.contains("metric-value")),
            other => panic!("Expected Parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_output_skips_blank_lines() {
        let output = format!("{}\n\n{}\n", record(r#""1""#), record(r#""<not counted>""#));
        let results = parse_output(&output).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].counter_value, Some(1.0));
        assert_eq!(results[1].counter_value, None);
    }

    #[test]
    fn test_parse_output_fails_fast() {
        let output = format!("{}\nnot json\n{}", record("1"), record("2"));
        assert!(parse_output(&output).is_err());
        assert!(parse_output("").unwrap().is_empty());
    }
}
