// config.rs
// Connection settings assembled from a config file, CLI flags and PG* env vars.

use crate::db::models::{ConnectionParams, DEFAULT_HOST, DEFAULT_PORT};
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Partially specified connection settings. Later sources override earlier ones.
#[derive(Debug, Default, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConnectionConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub dbname: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
}

impl ConnectionConfig {
    /// Loads a YAML file, or JSON when the path ends in `.json`.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&contents)
                .with_context(|| format!("Invalid JSON config {}", path.display()))?
        } else {
            serde_yaml::from_str(&contents)
                .with_context(|| format!("Invalid YAML config {}", path.display()))?
        };
        Ok(config)
    }

    pub fn merge(self, overrides: ConnectionConfig) -> Self {
        Self {
            host: overrides.host.or(self.host),
            port: overrides.port.or(self.port),
            dbname: overrides.dbname.or(self.dbname),
            user: overrides.user.or(self.user),
            password: overrides.password.or(self.password),
        }
    }

    pub fn resolve(self) -> Result<ConnectionParams> {
        Ok(ConnectionParams {
            host: self.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: self.port.unwrap_or(DEFAULT_PORT),
            dbname: self.dbname.ok_or_else(|| anyhow!("Missing database name (--dbname or PGDATABASE)"))?,
            user: self.user.ok_or_else(|| anyhow!("Missing user (--user or PGUSER)"))?,
            password: self.password.unwrap_or_default(),
        })
    }
}
