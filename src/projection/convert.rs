//! Leaf converters.

use chrono::{DateTime, FixedOffset, NaiveDateTime, Timelike};

use crate::projection::error::{ProjectionError, ProjectionErrorKind, ProjectionResult};
use crate::projection::node::SourceNode;
use crate::projection::output::OutputValue;

/// Converts a present scalar into an output value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Converter {
    /// Pass the text through unchanged.
    Text,
    /// Normalize a date/time to canonical ISO-8601.
    Timestamp,
}

impl Converter {
    pub fn convert(self, node: &SourceNode) -> ProjectionResult<OutputValue> {
        let text = match node {
            SourceNode::Scalar(text) => text,
            other => {
                return Err(ProjectionError::new(ProjectionErrorKind::ExpectedScalar {
                    found: other.kind(),
                }))
            }
        };

        match self {
            Converter::Text => Ok(OutputValue::String(text.clone())),
            Converter::Timestamp => normalize_timestamp(text)
                .map(OutputValue::String)
                .map_err(ProjectionError::new),
        }
    }
}

/// Render a timestamp as `YYYY-MM-DDTHH:MM:SS[.ffffff][+HH:MM]`.
///
/// Microseconds are printed only when non-zero and the offset only when the
/// input carried one. Sub-microsecond digits are truncated.
pub fn normalize_timestamp(raw: &str) -> Result<String, ProjectionErrorKind> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::<FixedOffset>::parse_from_rfc3339(raw) {
        return Ok(render(dt.naive_local(), Some(*dt.offset())));
    }

    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| render(naive, None))
        .map_err(|e| ProjectionErrorKind::InvalidTimestamp {
            value: raw.to_string(),
            reason: e.to_string(),
        })
}

fn render(naive: NaiveDateTime, offset: Option<FixedOffset>) -> String {
    let mut out = naive.format("%Y-%m-%dT%H:%M:%S").to_string();

    // Leap seconds carry nanos >= 1e9.
    let micros = (naive.nanosecond() % 1_000_000_000) / 1_000;
    if micros != 0 {
        out.push_str(&format!(".{micros:06}"));
    }

    if let Some(offset) = offset {
        let secs = offset.local_minus_utc();
        let sign = if secs < 0 { '-' } else { '+' };
        let secs = secs.abs();
        out.push_str(&format!("{sign}{:02}:{:02}", secs / 3600, (secs % 3600) / 60));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_naive_timestamp_unchanged() {
        assert_eq!(
            normalize_timestamp("2023-01-01T10:00:00").unwrap(),
            "2023-01-01T10:00:00"
        );
    }

    #[test]
    fn test_upstream_precision_truncated_to_micros() {
        assert_eq!(
            normalize_timestamp("2014-02-20T18:16:58.6132845+00:00").unwrap(),
            "2014-02-20T18:16:58.613284+00:00"
        );
    }

    #[test]
    fn test_zulu_and_negative_offsets() {
        assert_eq!(
            normalize_timestamp("2023-06-01T08:30:00Z").unwrap(),
            "2023-06-01T08:30:00+00:00"
        );
        assert_eq!(
            normalize_timestamp("2023-06-01T08:30:00.5-05:30").unwrap(),
            "2023-06-01T08:30:00.500000-05:30"
        );
    }

    #[test]
    fn test_zero_fraction_is_dropped() {
        assert_eq!(
            normalize_timestamp("2023-01-01T10:00:00.000+01:00").unwrap(),
            "2023-01-01T10:00:00+01:00"
        );
    }

    #[test]
    fn test_unparseable_timestamp() {
        let err = normalize_timestamp("yesterday").unwrap_err();
        assert!(matches!(err, ProjectionErrorKind::InvalidTimestamp { ref value, .. } if value == "yesterday"));
    }

    #[test]
    fn test_text_converter_rejects_containers() {
        let err = Converter::Text
            .convert(&SourceNode::Sequence(vec![]))
            .unwrap_err();
        assert_eq!(err.kind, ProjectionErrorKind::ExpectedScalar { found: "sequence" });
    }

    #[test]
    fn test_text_converter_passes_through() {
        let value = Converter::Text.convert(&SourceNode::scalar("On time")).unwrap();
        assert_eq!(value, OutputValue::String("On time".into()));
    }
}
