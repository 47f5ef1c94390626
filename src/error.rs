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

// Error types for the backup pipeline
//
// Each stage has its own error type. `BackupError` is what the pipeline
// hands back to the binary; its Display output is complete on its own so
// a single log line is enough to diagnose a failed run.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error returned by a backup run
#[derive(Debug, Error)]
pub enum BackupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to export data: {0}")]
    Export(#[from] BrokerError),

    #[error("failed to download data: {0}")]
    Fetch(#[from] FetchError),

    #[error("failed to upload data: {0}")]
    Upload(#[from] UploadError),
}

impl BackupError {
    /// Pipeline stage the error originated from
    pub fn stage(&self) -> &'static str {
        match self {
            BackupError::Config(_) => "config",
            BackupError::Export(_) => "export",
            BackupError::Fetch(_) => "fetch",
            BackupError::Upload(_) => "upload",
        }
    }
}

/// Configuration could not be loaded or is incomplete
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required configuration: {}", .0.join(", "))]
    Missing(Vec<String>),

    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse YAML configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Failure talking to the broker's HTTP API
#[derive(Debug, Error)]
pub enum BrokerError {
    /// Connection, DNS or TLS failure before a status was received
    #[error("request {path} failed: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    /// Non-success status with the broker's `{code, message}` envelope
    #[error("request {path} failed with status code: {status}, error code: {code}, message: {message}")]
    Api {
        path: String,
        status: u16,
        code: String,
        message: String,
    },

    /// Non-success status with a body that is not the error envelope
    #[error("request {path} failed with status code: {status}")]
    Status { path: String, status: u16 },

    #[error("failed to decode response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid broker URL {url}: {message}")]
    InvalidUrl { url: String, message: String },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl BrokerError {
    pub fn is_transport(&self) -> bool {
        matches!(self, BrokerError::Transport { .. })
    }

    /// HTTP status code, if the broker answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            BrokerError::Api { status, .. } | BrokerError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Failure downloading the export artifact into its local file
#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Broker(#[from] BrokerError),

    #[error("failed to {action} local artifact: {source}")]
    Io {
        action: &'static str,
        #[source]
        source: io::Error,
    },
}

impl FetchError {
    pub(crate) fn io(action: &'static str, source: io::Error) -> Self {
        FetchError::Io { action, source }
    }
}

/// Storage backend rejected or could not read the artifact
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("put object {bucket}/{key} rejected: {message}")]
    Rejected {
        bucket: String,
        key: String,
        message: String,
    },

    #[error("failed to open upload body {}: {message}", .path.display())]
    Body { path: PathBuf, message: String },

    #[error("failed to {action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_lists_every_field() {
        let err = ConfigError::Missing(vec!["EMQX_URL".to_string(), "S3_BUCKET".to_string()]);
        assert_eq!(
            err.to_string(),
            "missing required configuration: EMQX_URL, S3_BUCKET"
        );
    }

    #[test]
    fn test_api_error_carries_code_and_message() {
        let err = BackupError::from(BrokerError::Api {
            path: "/api/v5/data/export".to_string(),
            status: 400,
            code: "BAD_REQUEST".to_string(),
            message: "invalid root_keys".to_string(),
        });

        let text = err.to_string();
        assert!(text.contains("BAD_REQUEST"));
        assert!(text.contains("invalid root_keys"));
        assert!(text.contains("400"));
        assert_eq!(err.stage(), "export");
    }

    #[test]
    fn test_broker_error_status() {
        let err = BrokerError::Status {
            path: "/api/v5/data/files/f1.json".to_string(),
            status: 502,
        };
        assert_eq!(err.status(), Some(502));
        assert!(!err.is_transport());
    }

    #[test]
    fn test_fetch_io_error_names_action() {
        let err = FetchError::io("rewind", io::Error::new(io::ErrorKind::Other, "boom"));
        assert_eq!(err.to_string(), "failed to rewind local artifact: boom");
        assert_eq!(BackupError::from(err).stage(), "fetch");
    }
}
