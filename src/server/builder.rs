//! ServerBuilder for fluent API to build HTTP servers

use super::middleware::{RateLimit, development_error_details, rate_limit, security_headers};
use super::router::{health_routes, resource_routes, route_not_found};
use crate::config::CatalogConfig;
use crate::core::store::DocumentDatabase;
use crate::resources::catalog;
use crate::resources::descriptor::ResourceDescriptor;
use crate::resources::handlers::ResourceHandlers;
use anyhow::{Result, bail};
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, header};
use axum::middleware::{from_fn, from_fn_with_state};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Builder for the catalog HTTP server
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new(InMemoryDatabase::new())
///     .with_config(CatalogConfig::load()?)
///     .with_catalog_resources()
///     .build()?;
/// ```
pub struct ServerBuilder<D: DocumentDatabase> {
    database: Arc<D>,
    config: CatalogConfig,
    resources: Vec<ResourceDescriptor>,
    custom_routes: Vec<Router>,
}

impl<D: DocumentDatabase> ServerBuilder<D> {
    /// Create a builder serving resources out of `database`
    pub fn new(database: D) -> Self {
        Self {
            database: Arc::new(database),
            config: CatalogConfig::default(),
            resources: Vec::new(),
            custom_routes: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: CatalogConfig) -> Self {
        self.config = config;
        self
    }

    /// Register one resource; its store is opened at build time
    pub fn register_resource(mut self, descriptor: ResourceDescriptor) -> Self {
        self.resources.push(descriptor);
        self
    }

    /// Register category, sub-category, brand and product
    pub fn with_catalog_resources(self) -> Self {
        catalog::all()
            .into_iter()
            .fold(self, |builder, descriptor| builder.register_resource(descriptor))
    }

    /// Add routes that don't fit the resource pattern
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Build the final router
    ///
    /// Pagination overrides from the configuration are applied per
    /// collection. Registering two resources with the same name or route is
    /// an error.
    ///
    /// Layers, innermost first: body limit, development error details,
    /// rate limit, security headers, CORS, tracing.
    pub fn build(self) -> Result<Router> {
        let mut names = HashSet::new();
        let mut routes = HashSet::new();
        let mut app = health_routes(self.database.clone());

        for descriptor in self.resources {
            if !names.insert(descriptor.name.clone()) {
                bail!("resource '{}' is registered twice", descriptor.name);
            }
            if !routes.insert(descriptor.route.clone()) {
                bail!("route '{}' is registered twice", descriptor.route);
            }

            let descriptor = match self.config.pagination_for(&descriptor.collection) {
                Some(pagination) => descriptor.with_pagination(pagination),
                None => descriptor,
            };

            tracing::info!(
                resource = %descriptor.name,
                route = %descriptor.route,
                collection = %descriptor.collection,
                "registering resource"
            );

            let store = self.database.collection(&descriptor.collection);
            app = app.merge(resource_routes(ResourceHandlers::new(store, descriptor)));
        }

        for custom_router in self.custom_routes {
            app = app.merge(custom_router);
        }

        let mut app = app
            .fallback(route_not_found)
            .layer(DefaultBodyLimit::max(self.config.server.body_limit_bytes));

        if self.config.is_development() {
            app = app.layer(from_fn(development_error_details));
        }
        let limits = self.config.server.rate_limit;
        if limits.enabled {
            tracing::info!(
                max_requests = limits.max_requests,
                window_secs = limits.window_secs,
                "rate limiting {} routes",
                super::middleware::API_PREFIX
            );
            app = app.layer(from_fn_with_state(RateLimit::new(&limits)?, rate_limit));
        }
        if self.config.server.security_headers {
            app = app.layer(from_fn(security_headers));
        }

        let app = app
            .layer(cors_layer(&self.config)?)
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                    .on_response(DefaultOnResponse::new().level(Level::INFO)),
            );

        Ok(app)
    }

    /// Serve the application with graceful shutdown
    ///
    /// Binds to the configured `host:port` and stops on SIGTERM or Ctrl+C.
    pub async fn serve(self) -> Result<()> {
        let addr = self.config.bind_address();
        let app = self.build()?;
        let listener = TcpListener::bind(&addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

fn cors_layer(config: &CatalogConfig) -> Result<CorsLayer> {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION]);

    let Some(origins) = config.cors_origins() else {
        return Ok(layer.allow_origin(Any));
    };

    let origins = origins
        .iter()
        .map(|origin| origin.parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| anyhow::anyhow!("invalid CORS origin: {}", e))?;

    tracing::info!(origins = ?origins, "CORS restricted to configured origins");
    Ok(layer.allow_origin(AllowOrigin::list(origins)))
}

/// Wait for a shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
