//! Catalog resources
//!
//! A resource is a [`ResourceDescriptor`] (collection, routes, search fields,
//! pagination, body rules) plus the generic [`ResourceHandlers`] bound to its
//! store. The four catalog resources live in [`catalog`].

pub mod catalog;
pub mod descriptor;
pub mod handlers;

pub use descriptor::{ResourceDescriptor, ScopeBinding};
pub use handlers::ResourceHandlers;
