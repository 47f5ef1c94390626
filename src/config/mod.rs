// Configuration module for emqx-s3-backup
//
// Provides:
// - Environment variable loading (EMQX_URL, S3_BUCKET, ...)
// - Optional YAML configuration file with ${VAR} substitution
// - Validation that reports every missing value at once

pub mod types;
mod loader;

pub use types::*;
pub use loader::{
    ConfigLoader, ENV_BROKER_PASSWORD, ENV_BROKER_URL, ENV_BROKER_USERNAME, ENV_BUCKET,
    ENV_ENDPOINT_URL, ENV_LOG_LEVEL, ENV_PREFIX, ENV_REGION,
};

use crate::error::ConfigError;
use std::path::Path;

/// Load configuration from the process environment
pub fn load_config() -> Result<BackupConfig, ConfigError> {
    ConfigLoader::load(None)
}

/// Load configuration from a YAML file, with environment variables taking precedence
pub fn load_config_file<P: AsRef<Path>>(path: P) -> Result<BackupConfig, ConfigError> {
    ConfigLoader::load(Some(path.as_ref()))
}
