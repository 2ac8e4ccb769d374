//! Connection configuration and its lookup surface.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StrataError};

/// Settings of one named database connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Hostname, or a filesystem path / `:memory:` for embedded backends.
    pub hostname: String,
    /// Backend kind, e.g. `"sqlite"`.
    #[serde(rename = "type")]
    pub kind: String,
    pub database: String,
    pub username: String,
    pub password: String,
    pub disable_utf8: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            hostname: "localhost".to_string(),
            kind: "sqlite".to_string(),
            database: String::new(),
            username: String::new(),
            password: String::new(),
            disable_utf8: false,
        }
    }
}

impl DatabaseConfig {
    /// An in-memory SQLite configuration, mostly useful in tests.
    pub fn memory() -> Self {
        Self {
            database: ":memory:".to_string(),
            ..Self::default()
        }
    }
}

/// Lookup of named connection configurations.
pub trait ConfigSource {
    /// The configuration registered under an identifier.
    fn database_config(&self, ident: &str) -> Result<DatabaseConfig>;

    /// The identifier of the default connection.
    fn default_database(&self) -> &str;
}

/// An in-process [`ConfigSource`] backed by a map.
#[derive(Debug, Clone, Default)]
pub struct MemoryConfigSource {
    databases: HashMap<String, DatabaseConfig>,
    default_database: String,
}

impl MemoryConfigSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a configuration; the first one registered becomes the default.
    pub fn with_database(mut self, ident: impl Into<String>, config: DatabaseConfig) -> Self {
        let ident = ident.into();
        if self.default_database.is_empty() {
            self.default_database = ident.clone();
        }
        self.databases.insert(ident, config);
        self
    }

    pub fn with_default_database(mut self, ident: impl Into<String>) -> Self {
        self.default_database = ident.into();
        self
    }
}

impl ConfigSource for MemoryConfigSource {
    fn database_config(&self, ident: &str) -> Result<DatabaseConfig> {
        self.databases.get(ident).cloned().ok_or_else(|| {
            StrataError::not_configured(format!("no database configured under \"{ident}\""))
        })
    }

    fn default_database(&self) -> &str {
        &self.default_database
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_registered_database_is_the_default() {
        let config = MemoryConfigSource::new()
            .with_database("main", DatabaseConfig::memory())
            .with_database("replica", DatabaseConfig::memory());
        assert_eq!(config.default_database(), "main");
        assert!(config.database_config("replica").is_ok());
        assert!(config.database_config("missing").is_err());
    }

    #[test]
    fn config_deserializes_with_renamed_kind() {
        let config: DatabaseConfig =
            serde_json::from_str(r#"{"type": "sqlite", "hostname": ":memory:"}"#).unwrap();
        assert_eq!(config.kind, "sqlite");
        assert_eq!(config.hostname, ":memory:");
        assert!(!config.disable_utf8);
    }
}
