//! Catalog REST API server
//!
//! ```bash
//! DB_STR=mongodb://localhost:27017 cargo run --features mongodb_backend --bin catalog-server
//! ```
//!
//! Without `DB_STR` (or without the `mongodb_backend` feature) documents are
//! kept in memory.

use anyhow::Result;
use catalog::config::CatalogConfig;
use catalog::server::ServerBuilder;
use catalog::storage::InMemoryDatabase;
use tracing_subscriber::{EnvFilter, prelude::*};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("catalog=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = CatalogConfig::load()?;
    tracing::info!(
        environment = ?config.environment,
        address = %config.bind_address(),
        "starting catalog server"
    );

    match config.database.uri.clone() {
        #[cfg(feature = "mongodb_backend")]
        Some(uri) => {
            let database = catalog::storage::MongoDatabase::connect(&uri, &config.database.name).await?;
            tracing::info!(database = %config.database.name, "connected to MongoDB");
            serve(database, config).await
        }
        #[cfg(not(feature = "mongodb_backend"))]
        Some(_) => {
            tracing::warn!("DB_STR is set but the mongodb_backend feature is disabled; using the in-memory store");
            serve(InMemoryDatabase::new(), config).await
        }
        None => {
            tracing::info!("DB_STR not set; using the in-memory store");
            serve(InMemoryDatabase::new(), config).await
        }
    }
}

async fn serve<D: catalog::core::DocumentDatabase>(database: D, config: CatalogConfig) -> Result<()> {
    ServerBuilder::new(database)
        .with_config(config)
        .with_catalog_resources()
        .serve()
        .await
}
