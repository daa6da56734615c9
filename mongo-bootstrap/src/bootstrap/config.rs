//! Configuration for the bootstrap binary
//!
//! Read from a YAML file. Only the default path may be absent, in which case
//! the built-in user is used; a path given in `INIT_MONGO_CONFIG` must exist.
//! `MONGODB_URI` and `MONGODB_SERVER_SELECTION_TIMEOUT` override the file.

use crate::descriptor::{UserDescriptor, DEFAULT_DATABASE};
use crate::error::BootstrapError;
use anyhow::{Context, Result};
use common::ConfigExt;
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use tracing::info;

/// Default location of the config file, overridable with `INIT_MONGO_CONFIG`.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/init-mongo/config.yml";

pub const DEFAULT_CONNECTION_URI: &str = "mongodb://localhost:27017";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    pub database: DatabaseConfig,
    pub user: UserDescriptor,
    /// User-defined roles that already exist on the server.
    pub custom_roles: Vec<String>,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            user: UserDescriptor::tester(),
            custom_roles: Vec::new(),
        }
    }
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub connection_uri: String,
    /// Target database. Falls back to the URI's default database, then `mongo`.
    pub name: Option<String>,
    pub server_selection_timeout_secs: u64,
    pub app_name: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            connection_uri: DEFAULT_CONNECTION_URI.to_string(),
            name: None,
            server_selection_timeout_secs: 30,
            app_name: "init-mongo".to_string(),
        }
    }
}

impl DatabaseConfig {
    /// The database the user is created in.
    ///
    /// `uri_default` is the default database as decoded by the driver's
    /// connection-string parser.
    pub fn target_database(&self, uri_default: Option<&str>) -> String {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .or(uri_default.filter(|n| !n.is_empty()))
            .unwrap_or(DEFAULT_DATABASE)
            .to_string()
    }
}

// The URI may carry a password; it is only ever logged from parsed options.
impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("connection_uri", &"<redacted>")
            .field("name", &self.name)
            .field(
                "server_selection_timeout_secs",
                &self.server_selection_timeout_secs,
            )
            .field("app_name", &self.app_name)
            .finish()
    }
}

impl BootstrapConfig {
    /// Load from `$INIT_MONGO_CONFIG` (or the default path), then apply
    /// environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = match String::env_opt("INIT_MONGO_CONFIG") {
            Some(path) => Self::from_path(Path::new(&path))?,
            None => Self::from_optional_path(Path::new(DEFAULT_CONFIG_PATH))?,
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Read a config file that must exist.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))
    }

    /// Read a config file, using the built-in user if it does not exist.
    pub fn from_optional_path(path: &Path) -> Result<Self> {
        let exists = path
            .try_exists()
            .with_context(|| format!("Failed to check config {}", path.display()))?;
        if !exists {
            info!(path = %path.display(), "No config file, using built-in user");
            return Ok(Self::default());
        }
        Self::from_path(path)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        // An empty document deserializes as null, not as an empty mapping.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Local checks that need no server: descriptor fields and role names.
    pub fn validate(&self) -> Result<(), BootstrapError> {
        self.user.validate(&self.custom_roles)
    }

    fn apply_env_overrides(&mut self) {
        if let Some(uri) = String::env_opt("MONGODB_URI") {
            self.database.connection_uri = uri;
        }
        self.database.server_selection_timeout_secs = u64::env_parse(
            "MONGODB_SERVER_SELECTION_TIMEOUT",
            self.database.server_selection_timeout_secs,
        );
    }
}
