use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 8001;
pub const DEFAULT_RESULTS_LIMIT: usize = 100;

/// Runtime configuration, read from the environment (and `.env`).
#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    pub port: u16,
    pub environment: String,
    /// Directory of `<collection>.json` files served by the in-memory store.
    pub data_dir: PathBuf,
    pub collection: String,
    /// Upper bound and default for the `take` parameter.
    pub results_limit: usize,
    pub default_sort_field: String,
    /// Field matched by the `ids` parameter.
    pub id_field: String,
    pub searchable_fields: Vec<String>,
    /// Fields never returned to clients.
    pub private_fields: Vec<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            environment: "development".to_string(),
            data_dir: PathBuf::from("./data"),
            collection: "documents".to_string(),
            results_limit: DEFAULT_RESULTS_LIMIT,
            default_sort_field: "tokenid".to_string(),
            id_field: "tokenid".to_string(),
            searchable_fields: vec![
                "name".to_string(),
                "character".to_string(),
                "background".to_string(),
            ],
            private_fields: vec!["_id".to_string()],
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let port = match env::var("PORT") {
            Ok(port) => port
                .parse::<u16>()
                .with_context(|| format!("Invalid PORT: {}", port))?,
            Err(_) => defaults.port,
        };

        let results_limit = match env::var("RESULTS_LIMIT") {
            Ok(limit) => {
                let limit = limit
                    .parse::<usize>()
                    .with_context(|| format!("Invalid RESULTS_LIMIT: {}", limit))?;
                if limit == 0 {
                    anyhow::bail!("RESULTS_LIMIT must be at least 1");
                }
                limit
            }
            Err(_) => defaults.results_limit,
        };

        Ok(Self {
            port,
            environment: env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            data_dir: env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            collection: env::var("COLLECTION_NAME").unwrap_or(defaults.collection),
            results_limit,
            default_sort_field: env::var("DEFAULT_SORT_FIELD")
                .unwrap_or(defaults.default_sort_field),
            id_field: env::var("ID_FIELD").unwrap_or(defaults.id_field),
            searchable_fields: env::var("SEARCHABLE_FIELDS")
                .map(|v| split_list(&v))
                .unwrap_or(defaults.searchable_fields),
            private_fields: env::var("PRIVATE_FIELDS")
                .map(|v| split_list(&v))
                .unwrap_or(defaults.private_fields),
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "PORT",
        "ENVIRONMENT",
        "DATA_DIR",
        "COLLECTION_NAME",
        "RESULTS_LIMIT",
        "DEFAULT_SORT_FIELD",
        "ID_FIELD",
        "SEARCHABLE_FIELDS",
        "PRIVATE_FIELDS",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();
        let config = ApiConfig::from_env().unwrap();
        assert_eq!(config, ApiConfig::default());
        assert_eq!(config.listen_addr(), "0.0.0.0:8001");
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        clear_env();
        env::set_var("PORT", "9000");
        env::set_var("COLLECTION_NAME", "rarities");
        env::set_var("RESULTS_LIMIT", "25");
        env::set_var("SEARCHABLE_FIELDS", "name, hat ,,torso");
        env::set_var("PRIVATE_FIELDS", "_id,internal");

        let config = ApiConfig::from_env().unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.collection, "rarities");
        assert_eq!(config.results_limit, 25);
        assert_eq!(config.searchable_fields, vec!["name", "hat", "torso"]);
        assert_eq!(config.private_fields, vec!["_id", "internal"]);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_invalid_port() {
        clear_env();
        env::set_var("PORT", "eighty");
        let result = ApiConfig::from_env();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("PORT"));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_zero_results_limit() {
        clear_env();
        env::set_var("RESULTS_LIMIT", "0");
        assert!(ApiConfig::from_env().is_err());
        clear_env();
    }
}
