//! Generic resource-handler factory
//!
//! [`ResourceHandlers`] builds the five operations of a resource (list, get,
//! create, update, delete) from a [`ResourceDescriptor`] and a
//! [`DocumentStore`]. It is instantiated once per resource at startup.

use crate::core::document::Document;
use crate::core::envelope::{DataEnvelope, ListEnvelope};
use crate::core::error::{CatalogError, CatalogResult, ResourceError, StorageError};
use crate::core::pipeline::QueryPipeline;
use crate::core::query::{Criteria, FieldCondition, QueryParams};
use crate::core::store::DocumentStore;
use crate::resources::descriptor::ResourceDescriptor;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// The operations of one resource, bound to its store
#[derive(Debug)]
pub struct ResourceHandlers<S: DocumentStore> {
    store: S,
    descriptor: Arc<ResourceDescriptor>,
}

impl<S: DocumentStore + Clone> Clone for ResourceHandlers<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            descriptor: self.descriptor.clone(),
        }
    }
}

impl<S: DocumentStore> ResourceHandlers<S> {
    pub fn new(store: S, descriptor: impl Into<Arc<ResourceDescriptor>>) -> Self {
        Self {
            store,
            descriptor: descriptor.into(),
        }
    }

    pub fn descriptor(&self) -> &ResourceDescriptor {
        &self.descriptor
    }

    /// List one page of documents
    ///
    /// `scope` is the parent identifier of a nested route; it is ignored when
    /// the resource declares no scope binding.
    #[instrument(skip(self, params), fields(resource = %self.descriptor.name))]
    pub async fn list(
        &self,
        params: QueryParams,
        scope: Option<&Uuid>,
    ) -> CatalogResult<ListEnvelope> {
        let base = match (scope, &self.descriptor.scope) {
            (Some(parent), Some(binding)) => Criteria::all().with_condition(
                FieldCondition::equals(binding.field.as_str(), parent.to_string()),
            ),
            _ => Criteria::all(),
        };

        let pipeline = QueryPipeline::new(params, base)
            .filter()
            .sort()
            .search(&self.descriptor.search)
            .limit_fields();

        let total = self
            .store
            .count(pipeline.criteria())
            .await
            .map_err(|e| self.storage_error("count", e))?;

        let prepared = pipeline.paginate(total, self.descriptor.pagination);
        let data = self
            .store
            .find(&prepared.query)
            .await
            .map_err(|e| self.storage_error("list", e))?;

        tracing::debug!(total, results = data.len(), "listed documents");
        Ok(ListEnvelope::new(data, prepared.pagination))
    }

    #[instrument(skip(self), fields(resource = %self.descriptor.name))]
    pub async fn get(&self, id: &Uuid) -> CatalogResult<DataEnvelope> {
        let document = self
            .store
            .find_by_id(id)
            .await
            .map_err(|e| self.storage_error("get", e))?
            .ok_or_else(|| self.not_found(id))?;

        Ok(DataEnvelope::new(document))
    }

    /// Insert a validated body; referential checks are not performed here
    #[instrument(skip(self, body), fields(resource = %self.descriptor.name))]
    pub async fn create(&self, body: Document) -> CatalogResult<DataEnvelope> {
        let document = self
            .store
            .insert(body)
            .await
            .map_err(|e| self.storage_error("create", e))?;

        tracing::info!(
            id = document.get("id").and_then(|v| v.as_str()).unwrap_or_default(),
            "document created"
        );
        Ok(DataEnvelope::new(document))
    }

    /// Atomically apply a validated body and return the updated document
    #[instrument(skip(self, body), fields(resource = %self.descriptor.name))]
    pub async fn update(&self, id: &Uuid, body: Document) -> CatalogResult<DataEnvelope> {
        let document = self
            .store
            .find_and_update(id, body)
            .await
            .map_err(|e| self.storage_error("update", e))?
            .ok_or_else(|| self.not_found(id))?;

        tracing::info!(%id, "document updated");
        Ok(DataEnvelope::new(document))
    }

    #[instrument(skip(self), fields(resource = %self.descriptor.name))]
    pub async fn delete(&self, id: &Uuid) -> CatalogResult<()> {
        self.store
            .find_and_delete(id)
            .await
            .map_err(|e| self.storage_error("delete", e))?
            .ok_or_else(|| self.not_found(id))?;

        tracing::info!(%id, "document deleted");
        Ok(())
    }

    fn not_found(&self, id: &Uuid) -> CatalogError {
        ResourceError::not_found(self.descriptor.name.as_str(), id).into()
    }

    fn storage_error(&self, operation: &'static str, source: anyhow::Error) -> CatalogError {
        tracing::error!(operation, error = %source, "storage operation failed");
        StorageError::OperationFailed {
            resource: self.descriptor.name.clone(),
            operation,
            source,
        }
        .into()
    }
}
