//! Storage capability traits
//!
//! A [`DocumentStore`] is one collection of opaque documents. A
//! [`DocumentDatabase`] hands out one store per resource collection and
//! answers health checks. Resource handlers are generic over the store type,
//! so each resource is bound to its backend once, at startup.

use crate::core::document::Document;
use crate::core::query::{Criteria, DocumentQuery};
use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

/// The capability set a resource collection must offer
///
/// Stores maintain the generic document fields (`id`, `createdAt`,
/// `updatedAt`, `__v`) and never return the internal `__v` field.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Name of the underlying collection
    fn collection_name(&self) -> &str;

    /// Execute a deferred query: criteria, sort, projection, skip and limit
    async fn find(&self, query: &DocumentQuery) -> Result<Vec<Document>>;

    /// Count documents matching the criteria
    async fn count(&self, criteria: &Criteria) -> Result<u64>;

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Document>>;

    /// Insert a new document and return it as stored
    async fn insert(&self, document: Document) -> Result<Document>;

    /// Atomically apply `changes` and return the post-update document
    ///
    /// Returns `None` when no document has this identifier.
    async fn find_and_update(&self, id: &Uuid, changes: Document) -> Result<Option<Document>>;

    /// Atomically remove a document, returning it if it existed
    async fn find_and_delete(&self, id: &Uuid) -> Result<Option<Document>>;
}

/// A database handing out one [`DocumentStore`] per collection
#[async_trait]
pub trait DocumentDatabase: Send + Sync + 'static {
    type Store: DocumentStore + Clone + 'static;

    /// Handle on the named collection
    fn collection(&self, name: &str) -> Self::Store;

    /// Check that the database answers
    async fn ping(&self) -> Result<()>;
}
