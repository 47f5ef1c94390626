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

// S3 backend implementation

use super::backend::{ArtifactStore, UploadDestination};
use crate::artifact::ScopedArtifact;
use crate::config::StorageConfig;
use crate::error::UploadError;
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::{debug, info, warn};

/// Uploads artifacts with a single `PutObject`
///
/// Credentials come from the AWS default chain. A client is built per
/// upload for the destination's region.
pub struct S3ArtifactStore {
    endpoint_url: Option<String>,
    force_path_style: bool,
    credentials: Option<Credentials>,
}

impl S3ArtifactStore {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            endpoint_url: config.endpoint_url.clone(),
            force_path_style: config.force_path_style,
            credentials: None,
        }
    }

    /// Use fixed credentials instead of the SDK's default provider chain
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    async fn client_for(&self, region: &str) -> Client {
        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(region.to_string()));

        if let Some(ref endpoint) = self.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }
        if let Some(ref credentials) = self.credentials {
            loader = loader.credentials_provider(credentials.clone());
        }

        let shared = loader.load().await;
        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if self.force_path_style {
            builder = builder.force_path_style(true);
        }

        Client::from_conf(builder.build())
    }
}

#[async_trait]
impl ArtifactStore for S3ArtifactStore {
    async fn put(
        &self,
        artifact: &mut ScopedArtifact,
        destination: &UploadDestination,
    ) -> Result<(), UploadError> {
        let key = destination.object_key();
        let client = self.client_for(&destination.region).await;

        let body = ByteStream::from_path(artifact.path())
            .await
            .map_err(|e| UploadError::Body {
                path: artifact.path().to_path_buf(),
                message: e.to_string(),
            })?;

        debug!(
            "Uploading {} bytes to s3://{}/{} in {}",
            artifact.len(),
            destination.bucket,
            key,
            destination.region
        );

        client
            .put_object()
            .bucket(&destination.bucket)
            .key(&key)
            .content_length(artifact.len() as i64)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                let message = DisplayErrorContext(&e).to_string();
                warn!(
                    "S3 put to s3://{}/{} failed: {}",
                    destination.bucket, key, message
                );
                UploadError::Rejected {
                    bucket: destination.bucket.clone(),
                    key: key.clone(),
                    message,
                }
            })?;

        info!("Uploaded s3://{}/{}", destination.bucket, key);
        Ok(())
    }

    fn backend_type(&self) -> &str {
        "s3"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_type() {
        let store = S3ArtifactStore::new(&StorageConfig::default());
        assert_eq!(store.backend_type(), "s3");
    }

    #[test]
    fn test_custom_endpoint_kept() {
        let config = StorageConfig {
            endpoint_url: Some("http://minio:9000".to_string()),
            force_path_style: true,
            ..Default::default()
        };
        let store = S3ArtifactStore::new(&config);
        assert_eq!(store.endpoint_url.as_deref(), Some("http://minio:9000"));
        assert!(store.force_path_style);
    }
}
