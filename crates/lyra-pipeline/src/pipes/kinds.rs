//! Per-kind value checks and casts.

use lyra_core::{ApiError, Outcome, PropertyKind};
use serde_json::{Number, Value};

/// Checks a value against its declared kind.
///
/// Strings that [`cast`] can turn into the declared kind are accepted, since
/// most transports deliver path and query values as text.
///
/// ```
/// use lyra_core::PropertyKind;
/// use lyra_pipeline::pipes::check_kind;
/// use serde_json::json;
///
/// assert!(check_kind(PropertyKind::Integer, &json!(7)).is_ok());
/// assert!(check_kind(PropertyKind::Integer, &json!("7")).is_ok());
/// assert!(check_kind(PropertyKind::Integer, &json!("seven")).is_err());
/// ```
pub fn check_kind(kind: PropertyKind, value: &Value) -> Outcome<()> {
    let ok = match kind {
        PropertyKind::Any => true,
        PropertyKind::String => value.is_string(),
        PropertyKind::Integer => value.is_i64() || value.is_u64(),
        PropertyKind::Number => value.is_number(),
        PropertyKind::Boolean => value.is_boolean(),
        PropertyKind::Array => value.is_array(),
        PropertyKind::Object => value.is_object(),
    };

    if ok || cast(kind, value).is_some() {
        Ok(())
    } else {
        Err(ApiError::validation(format!(
            "expected {}, got {}",
            kind.name(),
            describe(value)
        ))
        .with_details(serde_json::json!({ "expected": kind.name() })))
    }
}

/// Casts a string value to the declared kind.
///
/// Returns `None` when the value is not a string, the kind has no textual
/// form, or the text does not parse.
pub fn cast(kind: PropertyKind, value: &Value) -> Option<Value> {
    let text = value.as_str()?.trim();
    match kind {
        PropertyKind::Integer => parse_integer(text),
        PropertyKind::Number => parse_integer(text).or_else(|| {
            text.parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
        }),
        PropertyKind::Boolean => {
            if text.eq_ignore_ascii_case("true") {
                Some(Value::Bool(true))
            } else if text.eq_ignore_ascii_case("false") {
                Some(Value::Bool(false))
            } else {
                None
            }
        }
        PropertyKind::String | PropertyKind::Array | PropertyKind::Object | PropertyKind::Any => None,
    }
}

// Same range as a JSON integer: i64, then u64 above i64::MAX.
fn parse_integer(text: &str) -> Option<Value> {
    text.parse::<i64>()
        .map(Value::from)
        .or_else(|_| text.parse::<u64>().map(Value::from))
        .ok()
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
