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

// EMQX data export client

use super::api::ExportApi;
use super::types::{ErrorEnvelope, ExportJobResult, ExportRequest};
use crate::artifact::ScopedArtifact;
use crate::config::BrokerConfig;
use crate::error::{BrokerError, FetchError};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const EXPORT_PATH: &str = "/api/v5/data/export";
pub const FILES_PATH: &str = "/api/v5/data/files";

/// HTTP client for the broker's export and download endpoints
///
/// One instance holds one connection pool; both `export` and `fetch`
/// go through it.
pub struct ExportClient {
    client: Client,
    base_url: String,
    username: String,
    password: String,
    request: ExportRequest,
    artifact_dir: Option<PathBuf>,
}

impl ExportClient {
    pub fn new(config: &BrokerConfig, request: ExportRequest) -> Result<Self, BrokerError> {
        let mut client_builder =
            reqwest::ClientBuilder::new().pool_idle_timeout(Duration::from_secs(90));

        if let Some(timeout) = config.timeout_seconds {
            client_builder = client_builder.timeout(Duration::from_secs(timeout));
        }

        let client = client_builder.build().map_err(BrokerError::Client)?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            password: config.password.clone(),
            request,
            artifact_dir: None,
        })
    }

    /// Directory for downloaded artifacts (system temp dir when unset)
    pub fn with_artifact_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.artifact_dir = dir;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn export_request(&self) -> &ExportRequest {
        &self.request
    }

    fn authorized(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .basic_auth(&self.username, Some(&self.password))
    }

    fn endpoint(&self, path: &str) -> Result<Url, BrokerError> {
        let url = format!("{}{}", self.base_url, path);
        Url::parse(&url).map_err(|e| BrokerError::InvalidUrl {
            url,
            message: e.to_string(),
        })
    }

    /// Download URL with `filename` percent-encoded as a single path segment
    pub fn file_url(&self, filename: &str) -> Result<Url, BrokerError> {
        let mut url = self.endpoint(FILES_PATH)?;
        url.path_segments_mut()
            .map_err(|_| BrokerError::InvalidUrl {
                url: self.base_url.clone(),
                message: "cannot be a base URL".to_string(),
            })?
            .push(filename);
        Ok(url)
    }

    /// Send a request and turn any non-success status into a `BrokerError`
    async fn send(&self, path: &str, request: RequestBuilder) -> Result<Response, BrokerError> {
        let response = request.send().await.map_err(|e| {
            warn!("Failed to request: {}, {}", path, e);
            BrokerError::Transport {
                path: path.to_string(),
                source: e,
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        match serde_json::from_str::<ErrorEnvelope>(&body) {
            Ok(envelope) => {
                warn!(
                    "Request {} failed with status code: {}, error code: {}, message: {}",
                    path,
                    status.as_u16(),
                    envelope.code,
                    envelope.message
                );
                Err(BrokerError::Api {
                    path: path.to_string(),
                    status: status.as_u16(),
                    code: envelope.code,
                    message: envelope.message,
                })
            }
            Err(e) => {
                warn!(
                    "Request {} failed with status code: {} (undecodable error body: {})",
                    path,
                    status.as_u16(),
                    e
                );
                Err(BrokerError::Status {
                    path: path.to_string(),
                    status: status.as_u16(),
                })
            }
        }
    }
}

#[async_trait]
impl ExportApi for ExportClient {
    async fn export(&self) -> Result<ExportJobResult, BrokerError> {
        debug!(
            "Requesting export of root keys {:?} and table sets {:?}",
            self.request.root_keys, self.request.table_sets
        );

        let request = self
            .authorized(Method::POST, self.endpoint(EXPORT_PATH)?)
            .json(&self.request);
        let response = self.send(EXPORT_PATH, request).await?;

        let job = response.json::<ExportJobResult>().await.map_err(|e| {
            warn!("Failed to decode export response: {}", e);
            BrokerError::Decode {
                path: EXPORT_PATH.to_string(),
                source: e,
            }
        })?;

        info!(
            "Export job finished on node '{}' with file '{}'",
            job.node, job.filename
        );
        Ok(job)
    }

    async fn fetch(&self, filename: &str, node: &str) -> Result<ScopedArtifact, FetchError> {
        let url = self.file_url(filename)?;
        let path = url.path().to_string();
        let request = self.authorized(Method::GET, url).query(&[("node", node)]);
        let mut response = self.send(&path, request).await?;

        // Dropping `artifact` on any early return below removes the partial file
        let mut artifact = ScopedArtifact::create(self.artifact_dir.as_deref()).map_err(|e| {
            warn!("Failed to create temp file: {}", e);
            FetchError::io("create", e)
        })?;

        loop {
            let chunk = response.chunk().await.map_err(|e| {
                warn!("Failed to read download body from {}: {}", path, e);
                BrokerError::Transport {
                    path: path.clone(),
                    source: e,
                }
            })?;

            let Some(chunk) = chunk else { break };
            artifact.write_all(&chunk).await.map_err(|e| {
                warn!("Failed to write response to file: {}", e);
                FetchError::io("write", e)
            })?;
        }

        artifact.rewind().await.map_err(|e| {
            warn!("Failed to seek to start of file: {}", e);
            FetchError::io("rewind", e)
        })?;

        info!(
            "Downloaded {} bytes from node '{}' to {}",
            artifact.len(),
            node,
            artifact.path().display()
        );
        Ok(artifact)
    }
}
