//! Validation and filtering system
//!
//! Resources declare their body rules as a [`ValidationConfig`]: per field, a
//! sequence of filters (trim, numeric coercion) followed by validators.
//! [`ValidatedBody`] applies them before a create or update handler runs.

pub mod config;
pub mod extractor;
pub mod filters;
pub mod validators;

pub use config::{FieldRules, Operation, ValidationConfig};
pub use extractor::{ValidatedBody, ValidationSource};
