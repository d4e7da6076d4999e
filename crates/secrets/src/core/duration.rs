//! Duration field decoding
//!
//! TTL fields arrive either as a number of seconds or as a humantime string
//! such as `"1h"` or `"1h 30m"`. Either way the value must be a whole
//! number of seconds.

use std::time::Duration;

use serde_json::Value;

use super::ValidationError;

/// Decode a duration-typed request field.
pub fn parse_duration_field(field: &'static str, raw: &Value) -> Result<Duration, ValidationError> {
    let invalid = |reason: String| ValidationError::InvalidField { field, reason };

    match raw {
        Value::Number(n) => n
            .as_u64()
            .map(Duration::from_secs)
            .ok_or_else(|| invalid(format!("expected a non-negative number of seconds, got {n}"))),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(Duration::ZERO);
            }
            if let Ok(secs) = s.parse::<u64>() {
                return Ok(Duration::from_secs(secs));
            }
            let parsed = humantime::parse_duration(s).map_err(|e| invalid(e.to_string()))?;
            if parsed.subsec_nanos() != 0 {
                return Err(invalid(format!("'{s}' is not a whole number of seconds")));
            }
            Ok(parsed)
        }
        other => Err(invalid(format!("expected seconds or a duration string, got {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!(3600), 3600)]
    #[case(json!("3600"), 3600)]
    #[case(json!("1h"), 3600)]
    #[case(json!("6h"), 21_600)]
    #[case(json!("1h 30m"), 5400)]
    #[case(json!("45s"), 45)]
    #[case(json!(""), 0)]
    #[case(json!(0), 0)]
    #[case(json!("2000ms"), 2)]
    fn test_accepted_forms(#[case] raw: Value, #[case] secs: u64) {
        assert_eq!(
            parse_duration_field("ttl", &raw).unwrap(),
            Duration::from_secs(secs)
        );
    }

    #[rstest]
    #[case(json!(-5))]
    #[case(json!("soon"))]
    #[case(json!(true))]
    #[case(json!([1]))]
    #[case(json!("1500ms"))]
    #[case(json!("1m 250ms"))]
    fn test_rejected_forms(#[case] raw: Value) {
        let err = parse_duration_field("max_ttl", &raw).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidField { field: "max_ttl", .. }
        ));
    }
}
