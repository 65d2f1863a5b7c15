//! Core building blocks: documents, query directives, the query pipeline,
//! pagination, storage traits, errors and request extractors

pub mod document;
pub mod envelope;
pub mod error;
pub mod extractors;
pub mod pagination;
pub mod pipeline;
pub mod query;
pub mod store;
pub mod validation;

pub use document::Document;
pub use envelope::{DataEnvelope, ListEnvelope};
pub use error::{CatalogError, CatalogResult};
pub use extractors::ResourceId;
pub use pagination::{PageWindow, PaginationResult, PaginationSettings};
pub use pipeline::{PreparedQuery, QueryPipeline, SearchSpec};
pub use query::{Criteria, DocumentQuery, Projection, QueryParams, SortKey};
pub use store::{DocumentDatabase, DocumentStore};
