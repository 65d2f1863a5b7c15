//! Request extractors shared by every resource handler

use crate::core::error::{CatalogError, RequestError};
use crate::core::query::QueryParams;
use axum::extract::{FromRequestParts, Path, Query};
use axum::http::request::Parts;
use uuid::Uuid;

/// The `{id}` path parameter, parsed as a UUID
///
/// Any other string is rejected with `INVALID_ID` (400) before a handler
/// runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceId(pub Uuid);

impl<S> FromRequestParts<S> for ResourceId
where
    S: Send + Sync,
{
    type Rejection = CatalogError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| RequestError::InvalidId {
                id: e.body_text(),
            })?;

        parse_id(&raw).map(ResourceId)
    }
}

/// Parse an identifier taken from a path segment
pub fn parse_id(raw: &str) -> Result<Uuid, CatalogError> {
    Uuid::parse_str(raw).map_err(|_| {
        CatalogError::Request(RequestError::InvalidId {
            id: raw.to_string(),
        })
    })
}

impl<S> FromRequestParts<S> for QueryParams
where
    S: Send + Sync,
{
    type Rejection = CatalogError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(pairs) = Query::<Vec<(String, String)>>::from_request_parts(parts, state)
            .await
            .map_err(|e| RequestError::InvalidBody {
                message: e.body_text(),
            })?;

        let params = QueryParams::from_pairs(pairs);
        tracing::debug!(params = ?params, "decoded query parameters");
        Ok(params)
    }
}
