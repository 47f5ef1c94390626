// Copyright 2025 coScene
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

// Configuration types for emqx-s3-backup

use crate::broker::ExportRequest;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BackupConfig {
    #[serde(default)]
    pub broker: BrokerConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    /// Configuration roots and tables to export
    #[serde(default)]
    pub export: ExportRequest,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Directory for the downloaded artifact (system temp dir when unset)
    #[serde(default)]
    pub artifact_dir: Option<PathBuf>,
}

/// EMQX management API endpoint and credentials
#[derive(Clone, Default, Deserialize, Serialize)]
pub struct BrokerConfig {
    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,

    /// Request timeout; no timeout beyond the transport default when unset
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

// Keeps the API password out of logs
impl fmt::Debug for BrokerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrokerConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

/// Upload destination and backend selection
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Backend type: "s3" or "filesystem"
    #[serde(default = "default_backend")]
    pub backend: String,

    #[serde(default)]
    pub bucket: String,

    #[serde(default)]
    pub region: String,

    /// Key prefix; empty (or null) means objects land at the bucket root
    #[serde(default, deserialize_with = "null_as_empty")]
    pub prefix: String,

    /// Custom endpoint for S3-compatible stores (MinIO, LocalStack)
    #[serde(default)]
    pub endpoint_url: Option<String>,

    #[serde(default)]
    pub force_path_style: bool,

    #[serde(default)]
    pub filesystem: Option<FilesystemConfig>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            bucket: String::new(),
            region: String::new(),
            prefix: String::new(),
            endpoint_url: None,
            force_path_style: false,
            filesystem: None,
        }
    }
}

// `prefix: ${S3_PATH:-}` substitutes to a YAML null
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FilesystemConfig {
    pub base_path: String,
}

impl Default for FilesystemConfig {
    fn default() -> Self {
        Self {
            base_path: "/data/backups".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String, // "trace", "debug", "info", "warn", "error"

    #[serde(default = "default_log_format")]
    pub format: String, // "text", "compact"
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// Default value functions
fn default_backend() -> String { "s3".to_string() }
fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "text".to_string() }
