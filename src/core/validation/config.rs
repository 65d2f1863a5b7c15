//! Declarative per-resource body rules

use crate::core::document::Document;
use crate::core::error::{FieldViolation, ValidationError};
use crate::core::validation::filters::slugify;
use indexmap::IndexMap;
use serde_json::Value;
use std::sync::Arc;

type FilterFn = Arc<dyn Fn(&str, Value) -> anyhow::Result<Value> + Send + Sync>;
type ValidatorFn = Arc<dyn Fn(&str, &Value) -> Result<(), String> + Send + Sync>;

/// Which write a body is validated for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Required fields must be present
    Create,
    /// Every field is optional but still checked when present
    Update,
}

/// Filters and validators of a single field, applied in order
#[derive(Clone, Default)]
pub struct FieldRules {
    required: bool,
    filters: Vec<FilterFn>,
    validators: Vec<ValidatorFn>,
}

impl FieldRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Must be present and non-empty on create
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&str, Value) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.filters.push(Arc::new(filter));
        self
    }

    pub fn validate<V>(mut self, validator: V) -> Self
    where
        V: Fn(&str, &Value) -> Result<(), String> + Send + Sync + 'static,
    {
        self.validators.push(Arc::new(validator));
        self
    }

    /// Run filters then validators; the first failure wins
    fn apply(&self, field: &str, value: Value) -> Result<Value, String> {
        let mut value = value;
        for filter in &self.filters {
            value = filter(field, value).map_err(|e| e.to_string())?;
        }
        for validator in &self.validators {
            validator(field, &value)?;
        }
        Ok(value)
    }
}

impl std::fmt::Debug for FieldRules {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldRules")
            .field("required", &self.required)
            .field("filters", &self.filters.len())
            .field("validators", &self.validators.len())
            .finish()
    }
}

/// Body rules of one resource
///
/// Only declared fields are kept (strict mode); anything else in the body is
/// silently dropped.
#[derive(Debug, Clone, Default)]
pub struct ValidationConfig {
    fields: IndexMap<String, FieldRules>,
    slug_source: Option<String>,
}

impl ValidationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, rules: FieldRules) -> Self {
        self.fields.insert(name.into(), rules);
        self
    }

    /// Derive a `slug` from this field whenever it is written
    pub fn slug_from(mut self, field: impl Into<String>) -> Self {
        self.slug_source = Some(field.into());
        self
    }

    /// Validate and filter a request body
    ///
    /// Returns the document to write, or every violation found.
    pub fn validate(
        &self,
        operation: Operation,
        body: Value,
    ) -> Result<Document, ValidationError> {
        let Value::Object(mut input) = body else {
            return Err(ValidationError::FieldErrors(vec![FieldViolation::new(
                "body",
                "must be a JSON object",
            )]));
        };

        let mut output = Document::new();
        let mut violations = Vec::new();

        for (field, rules) in &self.fields {
            let value = match input.remove(field) {
                Some(Value::Null) | None => {
                    if rules.required && operation == Operation::Create {
                        violations.push(FieldViolation::new(field, format!("'{}' is required", field)));
                    }
                    continue;
                }
                Some(value) => value,
            };

            match rules.apply(field, value) {
                Ok(Value::String(s)) if s.is_empty() && rules.required => {
                    violations.push(FieldViolation::new(field, format!("'{}' is required", field)));
                }
                Ok(value) => {
                    output.insert(field.clone(), value);
                }
                Err(message) => violations.push(FieldViolation::new(field, message)),
            }
        }

        if !violations.is_empty() {
            return Err(ValidationError::FieldErrors(violations));
        }

        if let Some(source) = &self.slug_source
            && let Some(Value::String(text)) = output.get(source)
        {
            let slug = slugify(text);
            output.insert("slug".to_string(), Value::String(slug));
        }

        Ok(output)
    }
}
