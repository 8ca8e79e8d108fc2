use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::console::ConsoleEnvironment;
use crate::kernel::constants::{DEFAULT_ENVIRONMENT, PROD_ENVIRONMENT};
use crate::kernel::error::{Error, Result};

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigFormat {
    /// JSON format (.json)
    Json,
    /// YAML format (.yaml, .yml) - requires "yaml-config" feature
    #[cfg(feature = "yaml-config")]
    Yaml,
    /// TOML format (.toml) - requires "toml-config" feature
    #[cfg(feature = "toml-config")]
    Toml,
}

impl ConfigFormat {
    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "json",
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => "yaml",
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => "toml",
        }
    }

    /// Determine format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ConfigFormat::Json),
                #[cfg(feature = "yaml-config")]
                "yaml" | "yml" => Some(ConfigFormat::Yaml),
                #[cfg(feature = "toml-config")]
                "toml" => Some(ConfigFormat::Toml),
                _ => None,
            })
    }
}

/// Settings the front controller needs before a kernel exists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Environment the kernel boots in.
    pub environment: Option<String>,
    /// Debug flag; defaults to on outside "prod".
    pub debug: Option<bool>,
    /// Name of the cache wrapper to enable for HTTP requests.
    pub http_cache: Option<String>,
    /// Directory where the HTTP cache keeps entries between processes.
    pub http_cache_dir: Option<PathBuf>,
}

impl BootstrapConfig {
    /// Load from `path`, picking the format from its extension.
    pub fn load(path: &Path) -> Result<Self> {
        let format = ConfigFormat::from_path(path).ok_or_else(|| Error::Config {
            path: path.to_path_buf(),
            message: "unknown or unsupported config format".to_string(),
        })?;
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::io(e, format!("read config {}", path.display())))?;
        Self::parse(&content, format).map_err(|message| Error::Config {
            path: path.to_path_buf(),
            message,
        })
    }

    pub fn parse(content: &str, format: ConfigFormat) -> std::result::Result<Self, String> {
        match format {
            ConfigFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::from_str(content).map_err(|e| e.to_string()),
        }
    }

    /// Let `SYMFONY_ENV` and `SYMFONY_DEBUG` override the file.
    pub fn with_overrides(mut self, env: &ConsoleEnvironment) -> Self {
        if let Some(environment) = env.environment.clone().filter(|e| !e.is_empty()) {
            self.environment = Some(environment);
        }
        if let Some(debug) = env.debug.as_deref() {
            self.debug = Some(debug != "0");
        }
        self
    }

    pub fn environment(&self) -> &str {
        self.environment.as_deref().unwrap_or(DEFAULT_ENVIRONMENT)
    }

    pub fn debug(&self) -> bool {
        self.debug.unwrap_or_else(|| self.environment() != PROD_ENVIRONMENT)
    }
}
