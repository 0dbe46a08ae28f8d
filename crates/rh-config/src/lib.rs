//! Residence Hub Configuration
//!
//! TOML configuration with environment variable overrides. Every section
//! carries defaults, so an empty file (or no file at all) yields a config
//! that runs locally against `mongodb://localhost:27017`.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

mod loader;

pub use loader::ConfigLoader;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Root application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub mongodb: MongoConfig,
    pub auth: AuthConfig,
    pub payments: PaymentsConfig,
    pub store: StoreConfig,

    /// Relaxes secret validation for local runs
    pub dev_mode: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins; empty allows any origin
    pub cors_origins: Vec<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            cors_origins: vec!["http://localhost:5173".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            uri: "mongodb://localhost:27017".to_string(),
            database: "RealStateDb".to_string(),
        }
    }
}

/// Access token settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC signing secret
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub access_token_expiry_secs: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            issuer: "residence-hub".to_string(),
            audience: "residence-hub".to_string(),
            access_token_expiry_secs: 3600,
        }
    }
}

/// Payment provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentsConfig {
    pub stripe_secret_key: String,
    pub api_base: String,
    pub currency: String,
    pub timeout_secs: u64,
}

impl Default for PaymentsConfig {
    fn default() -> Self {
        Self {
            stripe_secret_key: String::new(),
            api_base: "https://api.stripe.com".to_string(),
            currency: "usd".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Which repository implementation backs the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Mongo,
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(StoreBackend::Mongo),
            "memory" | "in-memory" => Ok(StoreBackend::Memory),
            other => Err(ConfigError::ValidationError(format!(
                "unknown store backend '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration with environment variable override
    pub fn load() -> Result<Self, ConfigError> {
        ConfigLoader::new().load()
    }

    /// Reject configurations the server cannot safely start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.secret.is_empty() && !self.dev_mode {
            return Err(ConfigError::ValidationError(
                "auth.secret must be set (ACCESS_TOKEN_SECRET or RH_JWT_SECRET)".to_string(),
            ));
        }
        if self.auth.access_token_expiry_secs <= 0 {
            return Err(ConfigError::ValidationError(
                "auth.access_token_expiry_secs must be positive".to_string(),
            ));
        }
        if self.http.port == 0 {
            return Err(ConfigError::ValidationError("http.port must not be 0".to_string()));
        }
        Ok(())
    }

    /// Example TOML configuration
    pub fn example_toml() -> String {
        r#"# Residence Hub Configuration
# Environment variables override these settings

dev_mode = false

[http]
host = "0.0.0.0"
port = 5000
cors_origins = ["http://localhost:5173"]

[mongodb]
uri = "mongodb://localhost:27017"
database = "RealStateDb"

[auth]
secret = ""
issuer = "residence-hub"
audience = "residence-hub"
access_token_expiry_secs = 3600

[payments]
stripe_secret_key = ""
api_base = "https://api.stripe.com"
currency = "usd"
timeout_secs = 30

[store]
backend = "mongo"  # mongo or memory
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.http.port, 5000);
        assert_eq!(config.mongodb.database, "RealStateDb");
        assert_eq!(config.auth.access_token_expiry_secs, 3600);
        assert_eq!(config.store.backend, StoreBackend::Mongo);
    }

    #[test]
    fn test_example_toml_parses() {
        let config = AppConfig::from_toml(&AppConfig::example_toml()).unwrap();
        assert_eq!(config.payments.currency, "usd");
        assert_eq!(config.http.cors_origins, vec!["http://localhost:5173"]);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml("[store]\nbackend = \"memory\"\n").unwrap();
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.http.port, 5000);
    }

    #[test]
    fn test_validate_requires_secret_outside_dev_mode() {
        let mut config = AppConfig::default();
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));

        config.dev_mode = true;
        assert!(config.validate().is_ok());

        config.dev_mode = false;
        config.auth.secret = "s3cret".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_store_backend_parsing() {
        assert_eq!("MongoDB".parse::<StoreBackend>().unwrap(), StoreBackend::Mongo);
        assert_eq!("memory".parse::<StoreBackend>().unwrap(), StoreBackend::Memory);
        assert!("redis".parse::<StoreBackend>().is_err());
    }
}
