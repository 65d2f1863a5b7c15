//! Immutable description of one catalog resource

use crate::core::pagination::PaginationSettings;
use crate::core::pipeline::SearchSpec;
use crate::core::validation::ValidationConfig;

/// A parent-derived filter taken from a path parameter
///
/// For sub-categories listed under
/// `/api/v1/categories/{categoryId}/sub-categories`, the `categoryId`
/// parameter becomes an equality on the `category` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeBinding {
    pub path_param: String,
    pub field: String,
    /// Route of the parent resource the nested routes hang off
    pub parent_route: String,
    /// Segment appended after `{path_param}` in nested routes
    pub nested_segment: String,
}

impl ScopeBinding {
    /// Full nested route, e.g. `/api/v1/categories/{categoryId}/sub-categories`
    pub fn nested_route(&self) -> String {
        format!(
            "{}/{{{}}}/{}",
            self.parent_route, self.path_param, self.nested_segment
        )
    }
}

/// Everything the generic handlers need to know about a resource
#[derive(Debug, Clone)]
pub struct ResourceDescriptor {
    /// Singular name used in logs and errors (`product`)
    pub name: String,
    /// Collection holding the documents (`products`)
    pub collection: String,
    /// Mount point of the resource routes (`/api/v1/products`)
    pub route: String,
    pub search: SearchSpec,
    pub pagination: PaginationSettings,
    pub scope: Option<ScopeBinding>,
    pub validation: ValidationConfig,
}

impl ResourceDescriptor {
    pub fn new(
        name: impl Into<String>,
        collection: impl Into<String>,
        route: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            collection: collection.into(),
            route: route.into(),
            search: SearchSpec::new(&["search"], &["name"]),
            pagination: PaginationSettings::default(),
            scope: None,
            validation: ValidationConfig::default(),
        }
    }

    pub fn with_search(mut self, search: SearchSpec) -> Self {
        self.search = search;
        self
    }

    pub fn with_pagination(mut self, pagination: PaginationSettings) -> Self {
        self.pagination = pagination;
        self
    }

    pub fn with_scope(mut self, scope: ScopeBinding) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn with_validation(mut self, validation: ValidationConfig) -> Self {
        self.validation = validation;
        self
    }
}
