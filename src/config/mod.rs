//! Configuration loading and management
//!
//! Settings come from an optional YAML file and are then overridden by
//! environment variables:
//!
//! | variable           | setting                  | default               |
//! |--------------------|--------------------------|-----------------------|
//! | `CATALOG_CONFIG`   | YAML file path           | `config/catalog.yaml` |
//! | `CATALOG_ENV`      | `environment`            | `development`         |
//! | `HOST`             | `server.host`            | `0.0.0.0`             |
//! | `PORT`             | `server.port`            | `3000`                |
//! | `CORS_ORIGIN`      | `server.cors_origin`     | `*`                   |
//! | `BODY_LIMIT_BYTES` | `server.body_limit_bytes`| `51200`               |
//! | `RATE_LIMIT_MAX`   | `server.rate_limit.max_requests` | `100`         |
//! | `RATE_LIMIT_WINDOW_SECS` | `server.rate_limit.window_secs` | `900`  |
//! | `DB_STR`           | `database.uri`           | none (in-memory)      |
//! | `DB_NAME`          | `database.name`          | `ecommerce`           |
//!
//! In `development`, 5xx error bodies carry the error's source chain under
//! `details.sources`.

use crate::core::error::ConfigError;
use crate::core::pagination::PaginationSettings;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

/// Config file used when `CATALOG_CONFIG` is not set
pub const DEFAULT_CONFIG_PATH: &str = "config/catalog.yaml";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
    Test,
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            "test" => Ok(Environment::Test),
            other => Err(ConfigError::invalid(
                "environment",
                other,
                "expected development, production or test",
            )),
        }
    }
}

/// HTTP server settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// `*` or a comma-separated list of allowed origins
    pub cors_origin: String,
    /// Maximum accepted request body size
    pub body_limit_bytes: usize,
    /// Add `X-Content-Type-Options`, `X-Frame-Options` and related headers
    pub security_headers: bool,
    pub rate_limit: RateLimitConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            cors_origin: "*".to_string(),
            body_limit_bytes: 50 * 1024,
            security_headers: true,
            rate_limit: RateLimitConfig::default(),
        }
    }
}

/// Per-client request limit on `/api` routes
///
/// A client may send `max_requests` at once; capacity refills evenly over
/// `window_secs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub max_requests: u32,
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests: 100,
            window_secs: 15 * 60,
        }
    }
}

/// Document database settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// MongoDB connection string; the in-memory store is used when absent
    pub uri: Option<String>,
    pub name: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            uri: None,
            name: "ecommerce".to_string(),
        }
    }
}

/// Complete service configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    /// Pagination overrides keyed by collection name (`products`, ...)
    pub pagination: HashMap<String, PaginationSettings>,
}

impl CatalogConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::FileNotFound {
                path: path.display().to_string(),
            },
            _ => ConfigError::IoError {
                message: e.to_string(),
            },
        })?;

        serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            origin: format!("file '{}'", path.display()),
            message: e.to_string(),
        })
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError {
            origin: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    /// Load from the file named by `CATALOG_CONFIG` (or the default path when
    /// it exists), apply environment overrides and validate
    pub fn load() -> Result<Self, ConfigError> {
        let config = match std::env::var("CATALOG_CONFIG") {
            Ok(path) => Self::from_yaml_file(path)?,
            Err(_) if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_yaml_file(DEFAULT_CONFIG_PATH)?
            }
            Err(_) => Self::default(),
        };

        let config = config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Override settings from environment-style variables
    ///
    /// `lookup` returns the value of a variable, if set.
    pub fn apply_env<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(env) = lookup("CATALOG_ENV") {
            self.environment = env.parse()?;
        }
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::invalid("PORT", port.as_str(), "expected a port number"))?;
        }
        if let Some(origin) = lookup("CORS_ORIGIN") {
            self.server.cors_origin = origin;
        }
        if let Some(limit) = lookup("BODY_LIMIT_BYTES") {
            self.server.body_limit_bytes = limit.trim().parse().map_err(|_| {
                ConfigError::invalid("BODY_LIMIT_BYTES", limit.as_str(), "expected a byte count")
            })?;
        }
        if let Some(max) = lookup("RATE_LIMIT_MAX") {
            self.server.rate_limit.max_requests = max.trim().parse().map_err(|_| {
                ConfigError::invalid("RATE_LIMIT_MAX", max.as_str(), "expected a request count")
            })?;
        }
        if let Some(window) = lookup("RATE_LIMIT_WINDOW_SECS") {
            self.server.rate_limit.window_secs = window.trim().parse().map_err(|_| {
                ConfigError::invalid(
                    "RATE_LIMIT_WINDOW_SECS",
                    window.as_str(),
                    "expected a number of seconds",
                )
            })?;
        }
        if let Some(uri) = lookup("DB_STR").filter(|uri| !uri.trim().is_empty()) {
            self.database.uri = Some(uri);
        }
        if let Some(name) = lookup("DB_NAME") {
            self.database.name = name;
        }
        Ok(self)
    }

    /// Check values that cannot be expressed by the types alone
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(uri) = &self.database.uri
            && !(uri.starts_with("mongodb://") || uri.starts_with("mongodb+srv://"))
        {
            return Err(ConfigError::invalid(
                "database.uri",
                uri.as_str(),
                "must start with mongodb:// or mongodb+srv://",
            ));
        }
        if self.database.name.trim().is_empty() {
            return Err(ConfigError::invalid("database.name", "", "must not be empty"));
        }
        if self.server.body_limit_bytes == 0 {
            return Err(ConfigError::invalid(
                "server.body_limit_bytes",
                "0",
                "must be greater than zero",
            ));
        }
        let rate_limit = &self.server.rate_limit;
        if rate_limit.enabled && (rate_limit.max_requests == 0 || rate_limit.window_secs == 0) {
            return Err(ConfigError::invalid(
                "server.rate_limit",
                format!("{:?}", rate_limit),
                "max_requests and window_secs must be at least 1",
            ));
        }
        for (collection, settings) in &self.pagination {
            if settings.max_limit == 0 || settings.default_limit == 0 {
                return Err(ConfigError::invalid(
                    format!("pagination.{}", collection),
                    format!("{:?}", settings),
                    "limits must be at least 1",
                ));
            }
            if settings.default_limit > settings.max_limit {
                return Err(ConfigError::invalid(
                    format!("pagination.{}", collection),
                    format!("{:?}", settings),
                    "default_limit must not exceed max_limit",
                ));
            }
        }
        Ok(())
    }

    /// Allowed CORS origins, or `None` for any origin
    pub fn cors_origins(&self) -> Option<Vec<String>> {
        let origin = self.server.cors_origin.trim();
        if origin.is_empty() || origin == "*" {
            return None;
        }
        Some(
            origin
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    /// Pagination override for a collection
    pub fn pagination_for(&self, collection: &str) -> Option<PaginationSettings> {
        self.pagination.get(collection).copied()
    }

    /// `host:port` to bind the listener to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }
}
