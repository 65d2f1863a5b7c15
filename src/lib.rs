//! # Catalog
//!
//! Generic resource handlers and a query pipeline for an e-commerce catalog
//! REST API (categories, sub-categories, brands, products) backed by a
//! document database.
//!
//! ## Features
//!
//! - **Handler factory**: list/get/create/update/delete built from a
//!   [`ResourceDescriptor`](resources::ResourceDescriptor)
//! - **Query pipeline**: filter, sort, search, field selection and pagination
//!   from the query string (`price[gte]=50&sort=-price&fields=title,price`)
//! - **Body validation**: per-resource field rules with filters and a derived slug
//! - **Storage**: in-memory store by default, MongoDB behind `mongodb_backend`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use catalog::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     ServerBuilder::new(InMemoryDatabase::new())
//!         .with_config(CatalogConfig::load()?)
//!         .with_catalog_resources()
//!         .serve()
//!         .await
//! }
//! ```

pub mod config;
pub mod core;
pub mod resources;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        CatalogError, CatalogResult, Criteria, DataEnvelope, Document, DocumentDatabase,
        DocumentQuery, DocumentStore, ListEnvelope, PageWindow, PaginationResult,
        PaginationSettings, Projection, QueryParams, QueryPipeline, ResourceId, SearchSpec,
        SortKey,
    };
    pub use crate::core::validation::{FieldRules, Operation, ValidatedBody, ValidationConfig};

    // === Resources ===
    pub use crate::resources::{ResourceDescriptor, ResourceHandlers, ScopeBinding};

    // === Storage ===
    pub use crate::storage::{InMemoryDatabase, InMemoryDocumentStore};
    #[cfg(feature = "mongodb_backend")]
    pub use crate::storage::{MongoDatabase, MongoDocumentStore};

    // === Config ===
    pub use crate::config::CatalogConfig;

    // === Server ===
    pub use crate::server::ServerBuilder;

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use serde::{Deserialize, Serialize};
    pub use uuid::Uuid;

    // === Axum ===
    pub use axum::Router;
}
