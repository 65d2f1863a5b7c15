//! HTTP server: resource routes, health check, 404 fallback, middleware and
//! the builder that assembles them

pub mod builder;
pub mod middleware;
pub mod router;

pub use builder::ServerBuilder;
pub use router::{ResourceState, resource_routes};
