// Configuration loader with environment variable substitution and overrides

use super::types::*;
use crate::error::ConfigError;
use regex::Regex;
use std::path::Path;

pub const ENV_BROKER_URL: &str = "EMQX_URL";
pub const ENV_BROKER_USERNAME: &str = "EMQX_API_NAME";
pub const ENV_BROKER_PASSWORD: &str = "EMQX_API_PASS";
pub const ENV_BUCKET: &str = "S3_BUCKET";
pub const ENV_REGION: &str = "S3_REGION";
pub const ENV_PREFIX: &str = "S3_PATH";
pub const ENV_ENDPOINT_URL: &str = "S3_ENDPOINT_URL";
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from the process environment and an optional YAML file
    pub fn load(path: Option<&Path>) -> Result<BackupConfig, ConfigError> {
        Self::load_with(path, |name| std::env::var(name).ok())
    }

    /// Load configuration from a fabricated environment only
    pub fn from_lookup<F>(lookup: F) -> Result<BackupConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::load_with(None, lookup)
    }

    /// Read the file (if any), apply environment overrides, then validate once
    pub fn load_with<F>(path: Option<&Path>, lookup: F) -> Result<BackupConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match path {
            Some(path) => Self::read_file(path, &lookup)?,
            None => BackupConfig::default(),
        };

        Self::apply_env_overrides(&mut config, &lookup);
        Self::validate(&config)?;

        Ok(config)
    }

    fn read_file<F>(path: &Path, lookup: &F) -> Result<BackupConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;

        let content = Self::substitute_env_vars(&content, lookup)?;

        Ok(serde_yaml::from_str(&content)?)
    }

    /// Substitute ${VAR} and ${VAR:-default} patterns
    ///
    /// Examples:
    /// - ${S3_BUCKET} -> my-bucket
    /// - ${S3_REGION:-us-east-1} -> us-east-1 (if S3_REGION not set)
    /// - ${S3_PATH:-} -> empty (if S3_PATH not set)
    fn substitute_env_vars<F>(content: &str, lookup: &F) -> Result<String, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let re = Regex::new(r"\$\{([^}:]+)(?::-([^}]*))?\}")
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        let substituted = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            let default_value = caps.get(2).map(|m| m.as_str());

            match lookup(var_name) {
                Some(value) => value,
                None => match default_value {
                    Some(default) => default.to_string(),
                    // Left as-is; validation reports it as missing
                    None => format!("${{{}}}", var_name),
                },
            }
        });

        Ok(substituted.into_owned())
    }

    fn apply_env_overrides<F>(config: &mut BackupConfig, lookup: &F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.is_empty());

        if let Some(url) = non_empty(ENV_BROKER_URL) {
            config.broker.url = url;
        }
        if let Some(username) = non_empty(ENV_BROKER_USERNAME) {
            config.broker.username = username;
        }
        if let Some(password) = non_empty(ENV_BROKER_PASSWORD) {
            config.broker.password = password;
        }
        if let Some(bucket) = non_empty(ENV_BUCKET) {
            config.storage.bucket = bucket;
        }
        if let Some(region) = non_empty(ENV_REGION) {
            config.storage.region = region;
        }
        // Set-but-empty clears a prefix from the file
        if let Some(prefix) = lookup(ENV_PREFIX) {
            config.storage.prefix = prefix;
        }
        if let Some(endpoint) = non_empty(ENV_ENDPOINT_URL) {
            config.storage.endpoint_url = Some(endpoint);
        }
        if let Some(level) = non_empty(ENV_LOG_LEVEL) {
            config.logging.level = level;
        }
    }

    /// Validate configuration, reporting every missing value at once
    fn validate(config: &BackupConfig) -> Result<(), ConfigError> {
        let mut missing = Vec::new();

        require(&mut missing, ENV_BROKER_URL, "broker.url", &config.broker.url);
        require(&mut missing, ENV_BROKER_USERNAME, "broker.username", &config.broker.username);
        require(&mut missing, ENV_BROKER_PASSWORD, "broker.password", &config.broker.password);

        match config.storage.backend.as_str() {
            "s3" => {
                require(&mut missing, ENV_BUCKET, "storage.bucket", &config.storage.bucket);
                require(&mut missing, ENV_REGION, "storage.region", &config.storage.region);
            }
            "filesystem" => {
                let base_path = config
                    .storage
                    .filesystem
                    .as_ref()
                    .map(|fs| fs.base_path.as_str())
                    .unwrap_or_default();
                if is_unset(base_path) {
                    missing.push("storage.filesystem.base_path".to_string());
                }
            }
            unknown => {
                return Err(ConfigError::Invalid(format!(
                    "unknown storage backend: '{}'. Supported: s3, filesystem",
                    unknown
                )))
            }
        }

        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        // Optional, so never reported missing; a leftover placeholder would end up in the key
        if config.storage.prefix.contains("${") {
            return Err(ConfigError::Invalid(format!(
                "storage.prefix contains an unresolved placeholder: '{}'. Set {} or use ${{VAR:-}} for an empty default",
                config.storage.prefix, ENV_PREFIX
            )));
        }

        let url = config.broker.url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "broker.url must start with http:// or https://, got '{}'",
                url
            )));
        }

        if config.export.is_empty() {
            return Err(ConfigError::Invalid(
                "export.root_keys and export.table_sets cannot both be empty".to_string(),
            ));
        }

        if !LOG_LEVELS.contains(&config.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::Invalid(format!(
                "logging.level must be one of {}, got '{}'",
                LOG_LEVELS.join(", "),
                config.logging.level
            )));
        }

        Ok(())
    }
}

fn require(missing: &mut Vec<String>, name: &str, field: &str, value: &str) {
    if is_unset(value) {
        missing.push(format!("{} ({})", name, field));
    }
}

/// Empty, or an unresolved `${VAR}` placeholder
fn is_unset(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || (value.starts_with("${") && value.ends_with('}'))
}
