//! Route wiring for resources, health checks and the 404 fallback
//!
//! Every resource gets the same five routes:
//! - GET    {route}        list
//! - POST   {route}        create (201)
//! - GET    {route}/{id}   get
//! - PUT    {route}/{id}   update
//! - DELETE {route}/{id}   delete (204)
//!
//! A resource with a scope binding additionally gets `GET|POST` on its nested
//! route, e.g. `/api/v1/categories/{categoryId}/sub-categories`.

use crate::core::envelope::{DataEnvelope, ListEnvelope};
use crate::core::error::{CatalogError, CatalogResult, RequestError, StorageError};
use crate::core::extractors::{ResourceId, parse_id};
use crate::core::query::QueryParams;
use crate::core::store::{DocumentDatabase, DocumentStore};
use crate::core::validation::{ValidatedBody, ValidationConfig, ValidationSource};
use crate::resources::descriptor::ResourceDescriptor;
use crate::resources::handlers::ResourceHandlers;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, Uri},
    routing::get,
};
use serde_json::{Value, json};
use std::sync::Arc;

/// Router state of one resource
#[derive(Debug)]
pub struct ResourceState<S: DocumentStore> {
    pub handlers: ResourceHandlers<S>,
}

impl<S: DocumentStore> ResourceState<S> {
    pub fn new(handlers: ResourceHandlers<S>) -> Self {
        Self { handlers }
    }

    pub fn descriptor(&self) -> &ResourceDescriptor {
        self.handlers.descriptor()
    }
}

impl<S: DocumentStore> ValidationSource for ResourceState<S> {
    fn validation(&self) -> &ValidationConfig {
        &self.descriptor().validation
    }

    fn scope_binding(&self) -> Option<(&str, &str)> {
        self.descriptor()
            .scope
            .as_ref()
            .map(|scope| (scope.path_param.as_str(), scope.field.as_str()))
    }
}

type SharedState<S> = State<Arc<ResourceState<S>>>;

/// Build the router of one resource, including its nested routes
pub fn resource_routes<S>(handlers: ResourceHandlers<S>) -> Router
where
    S: DocumentStore + 'static,
{
    let state = Arc::new(ResourceState::new(handlers));
    let descriptor = state.descriptor();

    let mut router = Router::new()
        .route(
            &descriptor.route,
            get(list_documents::<S>).post(create_document::<S>),
        )
        .route(
            &format!("{}/{{id}}", descriptor.route),
            get(get_document::<S>)
                .put(update_document::<S>)
                .delete(delete_document::<S>),
        );

    if let Some(scope) = &descriptor.scope {
        tracing::debug!(
            resource = %descriptor.name,
            route = %scope.nested_route(),
            "registering nested routes"
        );
        router = router.route(
            &scope.nested_route(),
            get(list_scoped_documents::<S>).post(create_scoped_document::<S>),
        );
    }

    router.with_state(state)
}

async fn list_documents<S: DocumentStore>(
    State(state): SharedState<S>,
    params: QueryParams,
) -> CatalogResult<Json<ListEnvelope>> {
    state.handlers.list(params, None).await.map(Json)
}

async fn list_scoped_documents<S: DocumentStore>(
    State(state): SharedState<S>,
    Path(parent): Path<String>,
    params: QueryParams,
) -> CatalogResult<Json<ListEnvelope>> {
    let parent = parse_id(&parent)?;
    state.handlers.list(params, Some(&parent)).await.map(Json)
}

async fn create_document<S: DocumentStore>(
    State(state): SharedState<S>,
    ValidatedBody(body): ValidatedBody,
) -> CatalogResult<(StatusCode, Json<DataEnvelope>)> {
    created(state.handlers.create(body).await)
}

async fn create_scoped_document<S: DocumentStore>(
    State(state): SharedState<S>,
    Path(parent): Path<String>,
    ValidatedBody(body): ValidatedBody,
) -> CatalogResult<(StatusCode, Json<DataEnvelope>)> {
    parse_id(&parent)?;
    created(state.handlers.create(body).await)
}

fn created(result: CatalogResult<DataEnvelope>) -> CatalogResult<(StatusCode, Json<DataEnvelope>)> {
    result.map(|envelope| (StatusCode::CREATED, Json(envelope)))
}

async fn get_document<S: DocumentStore>(
    State(state): SharedState<S>,
    ResourceId(id): ResourceId,
) -> CatalogResult<Json<DataEnvelope>> {
    state.handlers.get(&id).await.map(Json)
}

async fn update_document<S: DocumentStore>(
    State(state): SharedState<S>,
    ResourceId(id): ResourceId,
    ValidatedBody(body): ValidatedBody,
) -> CatalogResult<Json<DataEnvelope>> {
    state.handlers.update(&id, body).await.map(Json)
}

async fn delete_document<S: DocumentStore>(
    State(state): SharedState<S>,
    ResourceId(id): ResourceId,
) -> CatalogResult<StatusCode> {
    state.handlers.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /health`, answering only once the database responds to a ping
pub fn health_routes<D: DocumentDatabase>(database: Arc<D>) -> Router {
    Router::new()
        .route("/health", get(health_check::<D>))
        .with_state(database)
}

async fn health_check<D: DocumentDatabase>(
    State(database): State<Arc<D>>,
) -> CatalogResult<Json<Value>> {
    database.ping().await.map_err(|e| {
        CatalogError::from(StorageError::NotReady {
            message: e.to_string(),
        })
    })?;

    Ok(Json(json!({
        "status": "ok",
        "dbReady": true,
    })))
}

/// Fallback for every unmatched route
pub async fn route_not_found(uri: Uri) -> CatalogError {
    RequestError::RouteNotFound {
        path: uri.path().to_string(),
    }
    .into()
}
