/// CLI configuration
use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "encore.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EncoreConfig {
    #[serde(default = "default_storage")]
    pub storage: StorageSettings,

    #[serde(default = "default_admin")]
    pub admin: AdminSettings,

    #[serde(default = "default_display")]
    pub display: DisplaySettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    #[serde(default = "default_database_url")]
    pub database_url: String,

    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AdminSettings {
    #[serde(default)]
    pub secret: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DisplaySettings {
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,
}

impl EncoreConfig {
    /// Load configuration from file and environment
    ///
    /// `path` defaults to [`DEFAULT_CONFIG_FILE`]; a missing file is not an
    /// error. Environment variables prefixed with `ENCORE_` override the
    /// file, with `__` between section and key
    /// (e.g. `ENCORE_STORAGE__DATABASE_URL`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        let config_path = path.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), Path::to_path_buf);
        if config_path.exists() {
            settings = settings.add_source(config::File::from(config_path));
        } else if path.is_some() {
            return Err(CliError::Config(format!(
                "config file {} not found",
                config_path.display()
            )));
        }

        settings = settings.add_source(
            config::Environment::with_prefix("ENCORE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| CliError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.storage.database_url.trim().is_empty() {
            return Err(CliError::Config("storage.database_url is empty".to_string()));
        }

        if self.storage.schema_version != encore_storage::SCHEMA_VERSION {
            return Err(CliError::Config(format!(
                "storage.schema_version must be {}",
                encore_storage::SCHEMA_VERSION
            )));
        }

        if self.display.preview_chars == 0 {
            return Err(CliError::Config(
                "display.preview_chars must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// The admin secret; admin commands refuse to run without one
    pub fn admin_secret(&self) -> Result<&str> {
        let secret = self.admin.secret.trim();
        if secret.is_empty() {
            return Err(CliError::Config(
                "admin secret is required (set ENCORE_ADMIN__SECRET)".to_string(),
            ));
        }
        Ok(secret)
    }

    /// Filesystem path of the database, for `sqlite://` URLs
    pub fn database_path(&self) -> Option<PathBuf> {
        let url = &self.storage.database_url;
        let rest = url
            .strip_prefix("sqlite://")
            .or_else(|| url.strip_prefix("sqlite:"))?;
        let path = rest.split('?').next().unwrap_or(rest);
        if path.is_empty() || path == ":memory:" {
            return None;
        }
        Some(PathBuf::from(path))
    }
}

// Default values
fn default_storage() -> StorageSettings {
    StorageSettings {
        database_url: default_database_url(),
        schema_version: default_schema_version(),
    }
}

fn default_database_url() -> String {
    "sqlite://./data/encore.db".to_string()
}

fn default_schema_version() -> u32 {
    encore_storage::SCHEMA_VERSION
}

fn default_admin() -> AdminSettings {
    AdminSettings {
        secret: String::new(),
    }
}

fn default_display() -> DisplaySettings {
    DisplaySettings {
        preview_chars: default_preview_chars(),
    }
}

fn default_preview_chars() -> usize {
    encore_core::annotation::DEFAULT_PREVIEW_CHARS
}

impl Default for EncoreConfig {
    fn default() -> Self {
        Self {
            storage: default_storage(),
            admin: default_admin(),
            display: default_display(),
        }
    }
}
