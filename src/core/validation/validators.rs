//! Reusable field validators
//!
//! Each validator receives the field name and the (already filtered) value
//! and returns a client-facing message on failure.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;
use uuid::Uuid;

/// Validator: string length (in characters) must be within range
pub fn string_length(
    min: usize,
    max: usize,
) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    move |field: &str, value: &Value| {
        let Some(s) = value.as_str() else {
            return Err(format!("'{}' must be a string", field));
        };
        let len = s.chars().count();
        if len < min || len > max {
            Err(format!(
                "'{}' must be {}-{} characters long (got {})",
                field, min, max, len
            ))
        } else {
            Ok(())
        }
    }
}

/// Validator: string must have at least `min` characters
pub fn min_length(min: usize) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    move |field: &str, value: &Value| match value.as_str() {
        Some(s) if s.chars().count() >= min => Ok(()),
        Some(_) => Err(format!(
            "'{}' must be at least {} characters long",
            field, min
        )),
        None => Err(format!("'{}' must be a string", field)),
    }
}

fn name_regex() -> &'static Regex {
    static NAME: OnceLock<Regex> = OnceLock::new();
    NAME.get_or_init(|| Regex::new(r"^[\w\s-]+$").expect("valid name pattern"))
}

/// Validator: only letters, digits, underscores, spaces and dashes
pub fn name_pattern() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &Value| match value.as_str() {
        Some(s) if name_regex().is_match(s) => Ok(()),
        Some(_) => Err(format!(
            "'{}' must contain only letters, numbers, dashes, or spaces",
            field
        )),
        None => Err(format!("'{}' must be a string", field)),
    }
}

/// Validator: value must be a number within the inclusive bounds
pub fn number_range(
    min: Option<f64>,
    max: Option<f64>,
) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    move |field: &str, value: &Value| {
        let Some(num) = value.as_f64() else {
            return Err(format!("'{}' must be a number", field));
        };
        if let Some(min) = min
            && num < min
        {
            return Err(format!("'{}' must be at least {} (got {})", field, min, num));
        }
        if let Some(max) = max
            && num > max
        {
            return Err(format!("'{}' must be at most {} (got {})", field, max, num));
        }
        Ok(())
    }
}

/// Validator: value must be an integer not below `min`
pub fn integer_min(min: i64) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    move |field: &str, value: &Value| match value.as_i64() {
        Some(n) if n >= min => Ok(()),
        Some(n) => Err(format!("'{}' must be at least {} (got {})", field, min, n)),
        None => Err(format!("'{}' must be an integer", field)),
    }
}

/// Validator: value must be a string
pub fn is_string() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &Value| {
        if value.is_string() {
            Ok(())
        } else {
            Err(format!("'{}' must be a string", field))
        }
    }
}

/// Validator: value must be an array of strings
pub fn string_array() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &Value| match value.as_array() {
        Some(items) if items.iter().all(Value::is_string) => Ok(()),
        Some(_) => Err(format!("each entry of '{}' must be a string", field)),
        None => Err(format!("'{}' must be an array", field)),
    }
}

fn parses_as_uuid(value: &Value) -> bool {
    value
        .as_str()
        .is_some_and(|s| Uuid::parse_str(s).is_ok())
}

/// Validator: value must be a UUID string
pub fn uuid() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &Value| {
        if parses_as_uuid(value) {
            Ok(())
        } else {
            Err(format!("'{}' has an invalid ID format", field))
        }
    }
}

/// Validator: a UUID string or a non-empty array of UUID strings
pub fn uuid_or_uuid_array() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone
{
    |field: &str, value: &Value| match value {
        Value::Array(items) if !items.is_empty() => match items.iter().find(|v| !parses_as_uuid(v)) {
            None => Ok(()),
            Some(bad) => Err(format!("'{}' has an invalid ID format: {}", field, bad)),
        },
        single if parses_as_uuid(single) => Ok(()),
        _ => Err(format!("'{}' has an invalid ID format", field)),
    }
}
