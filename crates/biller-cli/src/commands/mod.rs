//! CLI commands.

pub mod batch;
pub mod config;
pub mod parse;
pub mod prompt;
pub mod summary;

use std::path::{Path, PathBuf};

use tracing::debug;

use biller_core::models::config::BillerConfig;

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("biller")
        .join("config.json")
}

/// Load the configuration from an explicit path, the default path, or defaults.
///
/// An explicit path must exist. The default path is only read when present.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<BillerConfig> {
    if let Some(path) = config_path {
        debug!("Loading config from {}", path);
        return Ok(BillerConfig::from_file(Path::new(path))?);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Loading config from {}", default_path.display());
        Ok(BillerConfig::from_file(&default_path)?)
    } else {
        Ok(BillerConfig::default())
    }
}
