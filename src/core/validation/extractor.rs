//! Axum extractor for validated request bodies
//!
//! [`ValidatedBody`] parses the JSON body, picks the operation from the HTTP
//! method and runs the resource's [`ValidationConfig`] before a handler sees
//! the payload.

use super::config::{Operation, ValidationConfig};
use crate::core::document::Document;
use crate::core::error::{CatalogError, RequestError};
use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, RawPathParams, Request},
    http::Method,
};
use serde_json::Value;
use std::sync::Arc;

/// Router state able to validate bodies for its resource
pub trait ValidationSource {
    fn validation(&self) -> &ValidationConfig;

    /// `(path parameter, body field)` filled from the path when the body
    /// omits the field, e.g. `("categoryId", "category")`
    fn scope_binding(&self) -> Option<(&str, &str)> {
        None
    }
}

impl<T: ValidationSource> ValidationSource for Arc<T> {
    fn validation(&self) -> &ValidationConfig {
        (**self).validation()
    }

    fn scope_binding(&self) -> Option<(&str, &str)> {
        (**self).scope_binding()
    }
}

/// A body that passed the resource's rules
///
/// ```rust,ignore
/// async fn create(State(state): State<Arc<Resource>>, ValidatedBody(doc): ValidatedBody) {
///     // doc only contains declared, filtered and validated fields
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedBody(pub Document);

impl ValidatedBody {
    pub fn into_inner(self) -> Document {
        self.0
    }
}

impl<S> FromRequest<S> for ValidatedBody
where
    S: ValidationSource + Send + Sync,
{
    type Rejection = CatalogError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let operation = match *req.method() {
            Method::PUT | Method::PATCH => Operation::Update,
            _ => Operation::Create,
        };

        let (mut parts, body) = req.into_parts();
        let scope_value = match state.scope_binding() {
            Some((param, _)) => RawPathParams::from_request_parts(&mut parts, state)
                .await
                .ok()
                .and_then(|params| {
                    params
                        .iter()
                        .find(|(key, _)| *key == param)
                        .map(|(_, value)| value.to_string())
                }),
            None => None,
        };
        let req = Request::from_parts(parts, body);

        let Json(mut payload): Json<Value> = Json::from_request(req, state)
            .await
            .map_err(|e| RequestError::InvalidBody {
                message: e.body_text(),
            })?;

        if let (Some((_, field)), Some(value), Value::Object(map)) =
            (state.scope_binding(), scope_value, &mut payload)
        {
            map.entry(field.to_string()).or_insert(Value::String(value));
        }

        let document = state.validation().validate(operation, payload)?;
        Ok(ValidatedBody(document))
    }
}
