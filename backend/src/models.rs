use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{ApiError, ParseError};

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct KineticsResponse {
    pub status: &'static str,
    pub velocity: f64,
    pub efficiency: f64,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct StabilityResponse {
    pub result: String,
}

/// One surviving CSV row: substrate, cost and rounded efficiency.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct EfficiencyRecord {
    pub s: f64,
    pub c: f64,
    pub eff: f64,
}

#[derive(Debug, Serialize, Clone, PartialEq, Default)]
pub struct CsvBatchResponse {
    pub results: Vec<EfficiencyRecord>,
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub timestamp: String,
}

impl HealthStatus {
    pub fn ok() -> Self {
        HealthStatus {
            status: "ok",
            service: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorBody {
    pub fn new(error: &str) -> Self {
        ErrorBody {
            error: error.to_string(),
            message: None,
        }
    }

    pub fn with_message(error: &str, message: &str) -> Self {
        ErrorBody {
            error: error.to_string(),
            message: Some(message.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatusBody {
    pub status: &'static str,
    pub message: String,
}

impl StatusBody {
    pub fn error(message: &str) -> Self {
        StatusBody {
            status: "error",
            message: message.to_string(),
        }
    }
}

/// An uploaded file, read fully into memory.
#[derive(Debug, Clone, Default)]
pub struct Upload {
    pub filename: String,
    pub content: Vec<u8>,
}

/// Reads a request body as JSON the way lenient form handlers do: anything
/// that is not declared as JSON, or does not parse, is simply absent.
pub fn read_json_body(content_type: &str, body: &[u8]) -> Option<Value> {
    if !is_json_mime(content_type) {
        return None;
    }
    serde_json::from_slice(body).ok()
}

fn is_json_mime(content_type: &str) -> bool {
    let mime = content_type.trim().to_ascii_lowercase();
    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}

/// Returns the request object, treating empty or falsy documents as missing.
pub fn require_object(data: Option<&Value>) -> Result<&Map<String, Value>, ApiError> {
    let data = match data {
        Some(value) if !is_falsy(value) => value,
        _ => return Err(ApiError::no_data()),
    };
    data.as_object()
        .ok_or_else(|| ApiError::InvalidInput("request body must be a JSON object".to_string()))
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// Coerces a JSON value to an integer, truncating fractional numbers.
pub fn parse_required_int(field: &str, value: &Value) -> Result<i64, ParseError> {
    match value {
        Value::Bool(b) => Ok(i64::from(*b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }
            if n.is_u64() {
                return Err(ParseError::OutOfRange {
                    field: field.to_string(),
                });
            }
            let f = n.as_f64().unwrap_or(f64::NAN);
            truncate(field, f)
        }
        Value::String(s) => s.trim().parse::<i64>().map_err(|_| not_numeric(field, value)),
        _ => Err(not_numeric(field, value)),
    }
}

/// Reads an optional integer field, falling back to `default` when absent.
pub fn int_field(data: &Map<String, Value>, field: &str, default: i64) -> Result<i64, ParseError> {
    match data.get(field) {
        Some(value) => parse_required_int(field, value),
        None => Ok(default),
    }
}

pub fn parse_required_float(field: &str, value: Option<&Value>) -> Result<f64, ParseError> {
    let value = value.ok_or_else(|| ParseError::Missing {
        field: field.to_string(),
    })?;
    let parsed = match value {
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    let parsed = parsed.ok_or_else(|| not_numeric(field, value))?;
    if !parsed.is_finite() {
        return Err(ParseError::NotFinite {
            field: field.to_string(),
        });
    }
    Ok(parsed)
}

fn truncate(field: &str, value: f64) -> Result<i64, ParseError> {
    // i64::MAX as f64 rounds up to 2^63, hence the strict upper bound.
    if value.is_finite() && value >= i64::MIN as f64 && value < i64::MAX as f64 {
        Ok(value.trunc() as i64)
    } else {
        Err(ParseError::OutOfRange {
            field: field.to_string(),
        })
    }
}

fn not_numeric(field: &str, value: &Value) -> ParseError {
    ParseError::NotNumeric {
        field: field.to_string(),
        value: value.to_string(),
    }
}

/// Rounds to `decimals` places, ties to even. Values too large to scale
/// are already integral at that precision and come back unchanged.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    let scaled = value * factor;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round_ties_even() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_body_requires_json_mime() {
        assert_eq!(
            read_json_body("application/json", br#"{"a":1}"#),
            Some(json!({ "a": 1 }))
        );
        assert_eq!(
            read_json_body("application/vnd.api+json", br#"{"a":1}"#),
            Some(json!({ "a": 1 }))
        );
        assert_eq!(read_json_body("text/plain", br#"{"a":1}"#), None);
        assert_eq!(read_json_body("application/json", b"{not json"), None);
        assert_eq!(read_json_body("application/json", b""), None);
    }

    #[test]
    fn falsy_documents_count_as_missing() {
        for doc in [json!(null), json!({}), json!([]), json!(""), json!(0), json!(false)] {
            assert_eq!(require_object(Some(&doc)), Err(ApiError::no_data()));
        }
        assert_eq!(require_object(None), Err(ApiError::no_data()));
    }

    #[test]
    fn non_object_documents_are_invalid() {
        let doc = json!([1, 2]);
        assert!(matches!(
            require_object(Some(&doc)),
            Err(ApiError::InvalidInput(_))
        ));
    }

    #[test]
    fn int_coercion() {
        assert_eq!(parse_required_int("s", &json!(12)), Ok(12));
        assert_eq!(parse_required_int("s", &json!(10.9)), Ok(10));
        assert_eq!(parse_required_int("s", &json!(-2.7)), Ok(-2));
        assert_eq!(parse_required_int("s", &json!(" 42 ")), Ok(42));
        assert_eq!(parse_required_int("s", &json!(true)), Ok(1));
        assert!(matches!(
            parse_required_int("s", &json!("10.5")),
            Err(ParseError::NotNumeric { .. })
        ));
        assert!(matches!(
            parse_required_int("s", &json!(null)),
            Err(ParseError::NotNumeric { .. })
        ));
        assert!(matches!(
            parse_required_int("s", &json!(1e300)),
            Err(ParseError::OutOfRange { .. })
        ));
        assert!(matches!(
            parse_required_int("s", &json!(u64::MAX)),
            Err(ParseError::OutOfRange { .. })
        ));
    }

    #[test]
    fn int_field_defaults_when_absent() {
        let data = json!({ "cost": 3 });
        let map = data.as_object().unwrap();
        assert_eq!(int_field(map, "cost", 1), Ok(3));
        assert_eq!(int_field(map, "substrate_concentration", 0), Ok(0));
    }

    #[test]
    fn float_coercion() {
        assert_eq!(parse_required_float("t", Some(&json!(36.6))), Ok(36.6));
        assert_eq!(parse_required_float("t", Some(&json!("7.4"))), Ok(7.4));
        assert_eq!(
            parse_required_float("t", None),
            Err(ParseError::Missing { field: "t".into() })
        );
        assert!(matches!(
            parse_required_float("t", Some(&json!("warm"))),
            Err(ParseError::NotNumeric { .. })
        ));
        assert!(matches!(
            parse_required_float("t", Some(&json!("inf"))),
            Err(ParseError::NotFinite { .. })
        ));
    }

    #[test]
    fn rounding() {
        assert_eq!(round_to(67.741_935, 2), 67.74);
        assert_eq!(round_to(1.354_838_7, 4), 1.3548);
        assert_eq!(round_to(0.0, 4), 0.0);
    }

    #[test]
    fn exact_ties_round_to_even() {
        // 50 / 64 and 100.125 are exact in binary
        assert_eq!(round_to(0.781_25, 4), 0.7812);
        assert_eq!(round_to(100.125, 2), 100.12);
        assert_eq!(round_to(0.5, 0), 0.0);
        assert_eq!(round_to(1.5, 0), 2.0);
        assert_eq!(round_to(-100.125, 2), -100.12);
    }

    #[test]
    fn huge_values_are_left_alone() {
        assert_eq!(round_to(1.5e305, 4), 1.5e305);
        assert_eq!(round_to(f64::MAX, 2), f64::MAX);
        assert!(round_to(1.5e305, 4).is_finite());
    }
}
