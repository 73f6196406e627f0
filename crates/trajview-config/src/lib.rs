//! Configuration for the trajview viewer server.
//!
//! Settings come from an optional JSON file, then environment overrides.
//! Every field has a default, so an empty object is a complete config.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use trajview_graph::LayoutConfig;

/// Path of the JSON config file.
pub const CONFIG_ENV: &str = "TRAJVIEW_CONFIG";
/// Overrides `server.addr`.
pub const ADDR_ENV: &str = "TRAJVIEW_ADDR";
/// Overrides `demo_trace`.
pub const DEMO_TRACE_ENV: &str = "TRAJVIEW_DEMO_TRACE";

// ─────────────────────────────────────────────────────────────────────────────
// Error
// ─────────────────────────────────────────────────────────────────────────────

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

// ─────────────────────────────────────────────────────────────────────────────
// Config Structs
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_addr")]
    pub addr: String,
    /// Largest accepted trace upload.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_addr() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_max_upload_bytes() -> usize {
    64 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewerConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub graph: LayoutConfig,
    /// Trace file served by the demo endpoint.
    #[serde(default)]
    pub demo_trace: Option<PathBuf>,
}

impl ViewerConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Reads the config file named by `TRAJVIEW_CONFIG`, if any, then applies
    /// the address and demo-trace overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ViewerConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = match lookup(CONFIG_ENV).filter(|p| !p.is_empty()) {
            Some(path) => {
                tracing::info!(path = %path, "Loading config file");
                Self::load(Path::new(&path))?
            }
            None => Self::default(),
        };

        if let Some(addr) = lookup(ADDR_ENV).filter(|a| !a.is_empty()) {
            config.server.addr = addr;
        }
        if let Some(demo) = lookup(DEMO_TRACE_ENV).filter(|d| !d.is_empty()) {
            config.demo_trace = Some(PathBuf::from(demo));
        }

        Ok(config)
    }
}
