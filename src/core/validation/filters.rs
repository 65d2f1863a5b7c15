//! Reusable field filters
//!
//! These filters transform field values before validation. A value the
//! filter does not apply to passes through unchanged and is left for the
//! validators to reject.

use anyhow::Result;
use serde_json::{Number, Value};

/// Filter: trim whitespace from string
pub fn trim() -> impl Fn(&str, Value) -> Result<Value> + Send + Sync + Clone {
    |_: &str, value: Value| {
        if let Some(s) = value.as_str() {
            Ok(Value::String(s.trim().to_string()))
        } else {
            Ok(value)
        }
    }
}

/// Filter: trim every string inside an array
pub fn trim_each() -> impl Fn(&str, Value) -> Result<Value> + Send + Sync + Clone {
    |_: &str, value: Value| match value {
        Value::Array(items) => Ok(Value::Array(
            items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => Value::String(s.trim().to_string()),
                    other => other,
                })
                .collect(),
        )),
        other => Ok(other),
    }
}

/// Filter: coerce a numeric string to a number
///
/// Integral strings become integers, everything else a float.
pub fn to_number() -> impl Fn(&str, Value) -> Result<Value> + Send + Sync + Clone {
    |_: &str, value: Value| {
        let Some(s) = value.as_str() else {
            return Ok(value);
        };
        let s = s.trim();
        if let Ok(n) = s.parse::<i64>() {
            return Ok(Value::from(n));
        }
        match s.parse::<f64>().ok().and_then(Number::from_f64) {
            Some(n) => Ok(Value::Number(n)),
            None => Ok(value),
        }
    }
}

/// Filter: coerce an integral string or integral float to an integer
pub fn to_integer() -> impl Fn(&str, Value) -> Result<Value> + Send + Sync + Clone {
    |_: &str, value: Value| {
        let coerced = match &value {
            Value::String(s) => s.trim().parse::<i64>().ok(),
            Value::Number(n) if n.as_i64().is_none() => n
                .as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64),
            _ => None,
        };
        Ok(coerced.map(Value::from).unwrap_or(value))
    }
}

/// Lowercase URL slug: runs of non-alphanumeric characters become one `-`
pub fn slugify(source: &str) -> String {
    let mut slug = String::with_capacity(source.len());
    let mut pending_dash = false;
    for c in source.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}
