//! Configuration loader with file and environment variable support

use crate::{AppConfig, ConfigError};
use std::env;
use std::path::PathBuf;
use tracing::{info, warn};

/// Standard config file search paths
const CONFIG_PATHS: &[&str] = &[
    "config.toml",
    "residence-hub.toml",
    "./config/config.toml",
    "/etc/residence-hub/config.toml",
];

pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Create a loader with a specific config file path
    pub fn with_path<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            config_path: Some(path.into()),
        }
    }

    /// Load configuration from file (if found) with environment variable overrides
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        self.load_with(|key| env::var(key).ok())
    }

    /// Same as [`load`](Self::load) but reads overrides through `lookup`.
    pub fn load_with<F>(&self, lookup: F) -> Result<AppConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match self.find_config_file(&lookup) {
            Some(path) => {
                info!(?path, "Loading configuration from file");
                AppConfig::from_file(&path)?
            }
            None => AppConfig::default(),
        };

        apply_overrides(&mut config, &lookup)?;
        Ok(config)
    }

    fn find_config_file<F>(&self, lookup: &F) -> Option<PathBuf>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = &self.config_path {
            if path.exists() {
                return Some(path.clone());
            }
            warn!(?path, "Configured config file does not exist");
        }

        if let Some(path) = lookup("RH_CONFIG").map(PathBuf::from) {
            if path.exists() {
                return Some(path);
            }
        }

        CONFIG_PATHS
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn first_of<F>(lookup: &F, keys: &[&str]) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    keys.iter().find_map(|key| lookup(key).filter(|v| !v.is_empty()))
}

/// Apply environment overrides. `RH_*` names win over the legacy names.
fn apply_overrides<F>(config: &mut AppConfig, lookup: &F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    // HTTP
    if let Some(val) = first_of(lookup, &["RH_HTTP_PORT", "PORT"]) {
        config.http.port = val
            .parse()
            .map_err(|_| ConfigError::ValidationError(format!("invalid port '{}'", val)))?;
    }
    if let Some(val) = first_of(lookup, &["RH_HTTP_HOST"]) {
        config.http.host = val;
    }
    if let Some(val) = first_of(lookup, &["RH_CORS_ORIGINS"]) {
        config.http.cors_origins = val
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
    }

    // MongoDB
    if let Some(val) = first_of(lookup, &["RH_MONGODB_URI"]) {
        config.mongodb.uri = val;
    }
    if let Some(val) = first_of(lookup, &["RH_MONGODB_DATABASE"]) {
        config.mongodb.database = val;
    }

    // Auth
    if let Some(val) = first_of(lookup, &["RH_JWT_SECRET", "ACCESS_TOKEN_SECRET"]) {
        config.auth.secret = val;
    }
    if let Some(val) = first_of(lookup, &["RH_JWT_ISSUER"]) {
        config.auth.issuer = val;
    }
    if let Some(val) = first_of(lookup, &["RH_JWT_EXPIRY_SECS"]) {
        if let Ok(secs) = val.parse() {
            config.auth.access_token_expiry_secs = secs;
        }
    }

    // Payments
    if let Some(val) = first_of(lookup, &["RH_STRIPE_SECRET_KEY", "STRIPE_SECRET_KEY"]) {
        config.payments.stripe_secret_key = val;
    }
    if let Some(val) = first_of(lookup, &["RH_STRIPE_API_BASE"]) {
        config.payments.api_base = val;
    }

    // Store
    if let Some(val) = first_of(lookup, &["RH_STORE_BACKEND"]) {
        config.store.backend = val.parse()?;
    }

    // General
    if let Some(val) = first_of(lookup, &["RH_DEV_MODE"]) {
        config.dev_mode = val == "true" || val == "1";
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StoreBackend;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_legacy_env_names() {
        let loader = ConfigLoader::with_path("/nonexistent/residence-hub.toml");
        let config = loader
            .load_with(lookup_from(&[
                ("PORT", "7000"),
                ("ACCESS_TOKEN_SECRET", "legacy-secret"),
                ("STRIPE_SECRET_KEY", "sk_test_123"),
            ]))
            .unwrap();

        assert_eq!(config.http.port, 7000);
        assert_eq!(config.auth.secret, "legacy-secret");
        assert_eq!(config.payments.stripe_secret_key, "sk_test_123");
    }

    #[test]
    fn test_prefixed_names_win() {
        let loader = ConfigLoader::with_path("/nonexistent/residence-hub.toml");
        let config = loader
            .load_with(lookup_from(&[
                ("PORT", "7000"),
                ("RH_HTTP_PORT", "8000"),
                ("ACCESS_TOKEN_SECRET", "legacy"),
                ("RH_JWT_SECRET", "modern"),
            ]))
            .unwrap();

        assert_eq!(config.http.port, 8000);
        assert_eq!(config.auth.secret, "modern");
    }

    #[test]
    fn test_file_then_env() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[mongodb]\ndatabase = \"from-file\"\n[store]\nbackend = \"memory\"").unwrap();

        let loader = ConfigLoader::with_path(file.path());
        let config = loader
            .load_with(lookup_from(&[("RH_CORS_ORIGINS", "https://a.example, https://b.example")]))
            .unwrap();

        assert_eq!(config.mongodb.database, "from-file");
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.http.cors_origins, vec!["https://a.example", "https://b.example"]);
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let loader = ConfigLoader::with_path("/nonexistent/residence-hub.toml");
        let result = loader.load_with(lookup_from(&[("PORT", "not-a-port")]));
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_unknown_store_backend_is_rejected() {
        let loader = ConfigLoader::with_path("/nonexistent/residence-hub.toml");
        let result = loader.load_with(lookup_from(&[("RH_STORE_BACKEND", "redis")]));
        assert!(result.is_err());
    }
}
