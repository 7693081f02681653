use serde::{Deserialize, Serialize};
use std::env;
use std::ops::RangeInclusive;
use std::time::Duration;
use thiserror::Error;

/// Fallback signing secret, only ever used outside production.
const DEVELOPMENT_JWT_SECRET: &str = "development-secret";

/// Token lifetimes beyond ten years are rejected.
const MAX_JWT_EXPIRY_HOURS: u64 = 24 * 365 * 10;
const MAX_UPSTREAM_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub security: SecurityConfig,
    pub source: SourceConfig,
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    /// Expected value of the `x-client-secret` header. `None` refuses every issuance.
    pub client_secret: Option<String>,
    pub jwt_expiry_hours: u64,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub kind: SourceKind,
    pub failure_policy: FailurePolicy,
    pub catalog: CatalogMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SourceKind {
    Upstream(UpstreamConfig),
    Database(DatabaseConfig),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    pub dataset_url: String,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

/// What the facade does when the backing store fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailurePolicy {
    /// Lists read as empty and lookups as absent.
    Degrade,
    /// The failure reaches the handler and becomes a 502.
    Error,
}

/// Where `/campuses` and `/organization-types` come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CatalogMode {
    /// Closed enumerations compiled into the binary, served as `[string]`.
    Builtin,
    /// Records read through the data source, served as `[{id, name}]`.
    Backend,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub expose_error_details: bool,
    pub max_request_size_bytes: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build a config from an arbitrary variable lookup (the process environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |names: &[&str]| -> Option<String> {
            names
                .iter()
                .find_map(|name| lookup(name))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let environment = match var(&["APP_ENV", "NODE_ENV"]).as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            _ => Environment::Development,
        };

        let mut config = match environment {
            Environment::Production => Self::production(),
            Environment::Development => Self::development(),
        };

        // Server
        if let Some(v) = var(&["HOST"]) {
            config.server.host = v;
        }
        if let Some(v) = var(&["PORT"]) {
            config.server.port = parse_var("PORT", &v)?;
        }

        // Security
        match var(&["JWT_SECRET"]) {
            Some(v) => config.security.jwt_secret = v,
            None if environment == Environment::Production => {
                return Err(ConfigError::Missing("JWT_SECRET"));
            }
            None => {}
        }
        config.security.client_secret = var(&["CLIENT_SECRET", "CLIENT_SECRET_1"]);
        if let Some(v) = var(&["JWT_EXPIRY_HOURS"]) {
            config.security.jwt_expiry_hours = parse_in_range("JWT_EXPIRY_HOURS", &v, 1..=MAX_JWT_EXPIRY_HOURS)?;
        }
        if let Some(v) = var(&["ALLOWED_ORIGINS"]) {
            config.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // Data source
        config.source.kind = match var(&["DATA_SOURCE"]).as_deref() {
            None | Some("upstream") => SourceKind::Upstream(UpstreamConfig {
                dataset_url: var(&["UPSTREAM_DATASET_URL", "SAKU_API_URL_GET_KUCLUB"])
                    .ok_or(ConfigError::Missing("UPSTREAM_DATASET_URL"))?,
                base_url: var(&["UPSTREAM_BASE_URL", "SAKU_API_URL"]),
                api_key: var(&["UPSTREAM_API_KEY", "SECRET_KEY_KUCLUB"]),
                timeout_secs: match var(&["UPSTREAM_TIMEOUT_SECS"]) {
                    Some(v) => parse_in_range("UPSTREAM_TIMEOUT_SECS", &v, 1..=MAX_UPSTREAM_TIMEOUT_SECS)?,
                    None => 10,
                },
            }),
            Some("database") | Some("postgres") => SourceKind::Database(DatabaseConfig {
                url: var(&["DATABASE_URL"]).ok_or(ConfigError::Missing("DATABASE_URL"))?,
                max_connections: match var(&["DATABASE_MAX_CONNECTIONS"]) {
                    Some(v) => parse_var("DATABASE_MAX_CONNECTIONS", &v)?,
                    None => 10,
                },
                connection_timeout: match var(&["DATABASE_CONNECTION_TIMEOUT"]) {
                    Some(v) => parse_var("DATABASE_CONNECTION_TIMEOUT", &v)?,
                    None => 5,
                },
            }),
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "DATA_SOURCE",
                    value: other.to_string(),
                })
            }
        };
        if let Some(v) = var(&["BACKEND_FAILURE_POLICY"]) {
            config.source.failure_policy = match v.as_str() {
                "degrade" => FailurePolicy::Degrade,
                "error" => FailurePolicy::Error,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "BACKEND_FAILURE_POLICY",
                        value: v,
                    })
                }
            };
        }
        if let Some(v) = var(&["CATALOG_MODE"]) {
            config.source.catalog = match v.as_str() {
                "builtin" => CatalogMode::Builtin,
                "backend" => CatalogMode::Backend,
                _ => return Err(ConfigError::Invalid { name: "CATALOG_MODE", value: v }),
            };
        }

        // API
        if let Some(v) = var(&["EXPOSE_ERROR_DETAILS"]) {
            config.api.expose_error_details = parse_var("EXPOSE_ERROR_DETAILS", &v)?;
        }

        Ok(config)
    }

    /// One-line description safe to log: no secrets, no credentials in URLs.
    pub fn summary(&self) -> String {
        let source = match &self.source.kind {
            SourceKind::Upstream(upstream) => format!("upstream ({}s timeout)", upstream.timeout_secs),
            SourceKind::Database(database) => format!("database (pool {})", database.max_connections),
        };
        format!(
            "env={} bind={}:{} source={} failure_policy={:?} catalog={:?} client_secret={}",
            self.environment.as_str(),
            self.server.host,
            self.server.port,
            source,
            self.source.failure_policy,
            self.source.catalog,
            if self.security.client_secret.is_some() { "set" } else { "unset" },
        )
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 9000,
            },
            security: SecurityConfig {
                jwt_secret: DEVELOPMENT_JWT_SECRET.to_string(),
                client_secret: None,
                jwt_expiry_hours: 24 * 7,
                cors_origins: vec![
                    "http://localhost:8000".to_string(),
                    "http://localhost:5173".to_string(),
                ],
            },
            source: SourceConfig {
                kind: SourceKind::Upstream(UpstreamConfig {
                    dataset_url: String::new(),
                    base_url: None,
                    api_key: None,
                    timeout_secs: 10,
                }),
                failure_policy: FailurePolicy::Degrade,
                catalog: CatalogMode::Builtin,
            },
            api: ApiConfig {
                expose_error_details: true,
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
            },
        }
    }

    pub fn production() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Production;
        config.security.jwt_secret = String::new();
        config.security.cors_origins = Vec::new();
        config.api.expose_error_details = false;
        config
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::Invalid {
        name,
        value: value.to_string(),
    })
}

fn parse_in_range<T>(name: &'static str, value: &str, range: RangeInclusive<T>) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd,
{
    let parsed: T = parse_var(name, value)?;
    if !range.contains(&parsed) {
        return Err(ConfigError::Invalid {
            name,
            value: value.to_string(),
        });
    }
    Ok(parsed)
}
