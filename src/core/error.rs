//! Typed error handling for the catalog service
//!
//! Every fallible operation surfaces a [`CatalogError`], split into the
//! categories a client can act on:
//!
//! - [`ResourceError`]: a keyed lookup found nothing
//! - [`RequestError`]: malformed identifiers, bodies or unknown routes
//! - [`ValidationError`]: request body rules were violated
//! - [`StorageError`]: the document database failed or is not reachable
//! - [`ConfigError`]: configuration could not be loaded
//!
//! `CatalogError` renders itself as a JSON error body:
//!
//! ```json
//! { "status": "fail", "code": "DOCUMENT_NOT_FOUND", "message": "No document found with id: ..." }
//! ```
//!
//! `status` is `fail` for client errors and `error` for server errors.
//! Server errors also attach their source chain to the response as an
//! [`ErrorSources`] extension.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// The main error type of the catalog service
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Should not happen in normal operation
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON body of an error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// `fail` (4xx) or `error` (5xx)
    pub status: &'static str,
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl CatalogError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            CatalogError::Resource(e) => e.status_code(),
            CatalogError::Request(e) => e.status_code(),
            CatalogError::Validation(_) => StatusCode::BAD_REQUEST,
            CatalogError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CatalogError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CatalogError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            CatalogError::Resource(e) => e.error_code(),
            CatalogError::Request(e) => e.error_code(),
            CatalogError::Validation(_) => "VALIDATION_FAILED",
            CatalogError::Storage(e) => e.error_code(),
            CatalogError::Config(_) => "CONFIG_ERROR",
            CatalogError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Convert to an error response body
    pub fn to_response(&self) -> ErrorResponse {
        let status = if self.status_code().is_client_error() {
            "fail"
        } else {
            "error"
        };
        ErrorResponse {
            status,
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    /// Messages of the underlying causes, outermost first
    pub fn sources(&self) -> Vec<String> {
        let mut sources = Vec::new();
        let mut current = std::error::Error::source(self);
        while let Some(err) = current {
            sources.push(err.to_string());
            current = err.source();
        }
        sources
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            CatalogError::Request(RequestError::TooManyRequests { retry_after_secs }) => {
                Some(serde_json::json!({ "retryAfter": retry_after_secs }))
            }
            CatalogError::Resource(ResourceError::NotFound { resource, id }) => {
                Some(serde_json::json!({ "resource": resource, "id": id }))
            }
            CatalogError::Validation(ValidationError::FieldErrors(errors)) => {
                Some(serde_json::json!({ "fields": errors }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "request failed");
        } else {
            tracing::warn!(code = self.error_code(), error = %self, "request rejected");
        }
        let sources = status.is_server_error().then(|| self.sources());
        let mut response = (status, Json(self.to_response())).into_response();
        if let Some(sources) = sources.filter(|s| !s.is_empty()) {
            response.extensions_mut().insert(ErrorSources(sources));
        }
        response
    }
}

/// Source chain of a server error, carried as a response extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorSources(pub Vec<String>);

// =============================================================================
// Resource Errors
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    /// No document with this identifier exists in the resource collection
    #[error("No document found with id: {id}")]
    NotFound { resource: String, id: String },
}

impl ResourceError {
    pub fn not_found(resource: impl Into<String>, id: impl ToString) -> Self {
        ResourceError::NotFound {
            resource: resource.into(),
            id: id.to_string(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ResourceError::NotFound { .. } => StatusCode::NOT_FOUND,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ResourceError::NotFound { .. } => "DOCUMENT_NOT_FOUND",
        }
    }
}

// =============================================================================
// Request Errors
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("Invalid id format: '{id}'")]
    InvalidId { id: String },

    #[error("Invalid request body: {message}")]
    InvalidBody { message: String },

    #[error("Could not Find the Route {path}")]
    RouteNotFound { path: String },

    #[error("Too many requests from this IP, please try again later.")]
    TooManyRequests { retry_after_secs: u64 },
}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::InvalidId { .. } => StatusCode::BAD_REQUEST,
            RequestError::InvalidBody { .. } => StatusCode::BAD_REQUEST,
            RequestError::RouteNotFound { .. } => StatusCode::NOT_FOUND,
            RequestError::TooManyRequests { .. } => StatusCode::TOO_MANY_REQUESTS,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::InvalidId { .. } => "INVALID_ID",
            RequestError::InvalidBody { .. } => "INVALID_BODY",
            RequestError::RouteNotFound { .. } => "ROUTE_NOT_FOUND",
            RequestError::TooManyRequests { .. } => "TOO_MANY_REQUESTS",
        }
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid input data. {}", join_violations(.0))]
    FieldErrors(Vec<FieldViolation>),
}

/// A single rejected field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("{}: {}", v.field, v.message))
        .collect::<Vec<_>>()
        .join(". ")
}

// =============================================================================
// Storage Errors
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The database did not answer a health check
    #[error("Database is not ready: {message}")]
    NotReady { message: String },

    #[error("Failed to {operation} {resource}: {source}")]
    OperationFailed {
        resource: String,
        operation: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl StorageError {
    pub fn error_code(&self) -> &'static str {
        match self {
            StorageError::NotReady { .. } => "DATABASE_NOT_READY",
            StorageError::OperationFailed { .. } => "STORAGE_ERROR",
        }
    }
}

// =============================================================================
// Config Errors
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to parse config {origin}: {message}")]
    ParseError { origin: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {message}")]
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("IO error: {message}")]
    IoError { message: String },
}

impl ConfigError {
    pub fn invalid(
        field: impl Into<String>,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ConfigError::InvalidValue {
            field: field.into(),
            value: value.into(),
            message: message.into(),
        }
    }
}

// =============================================================================
// Conversions from external errors
// =============================================================================

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::Request(RequestError::InvalidBody {
            message: err.to_string(),
        })
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(err: std::io::Error) -> Self {
        CatalogError::Config(ConfigError::IoError {
            message: err.to_string(),
        })
    }
}

impl From<serde_yaml::Error> for CatalogError {
    fn from(err: serde_yaml::Error) -> Self {
        CatalogError::Config(ConfigError::ParseError {
            origin: "<yaml>".to_string(),
            message: err.to_string(),
        })
    }
}

impl From<anyhow::Error> for CatalogError {
    fn from(err: anyhow::Error) -> Self {
        CatalogError::Internal(err.to_string())
    }
}

/// A specialized Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;
