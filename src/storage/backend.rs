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

// Artifact store trait for write-only uploads

use crate::artifact::ScopedArtifact;
use crate::config::StorageConfig;
use crate::error::UploadError;
use async_trait::async_trait;

/// Where an artifact is written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadDestination {
    pub bucket: String,
    pub region: String,
    pub prefix: String,
    /// Local artifact file name
    pub key: String,
}

impl UploadDestination {
    /// Effective object key: `prefix/key`, or `key` when there is no prefix
    pub fn object_key(&self) -> String {
        object_key(&self.prefix, &self.key)
    }
}

/// Bucket, region and prefix shared by every upload of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackupTarget {
    pub bucket: String,
    pub region: String,
    pub prefix: String,
}

impl BackupTarget {
    pub fn destination_for(&self, key: &str) -> UploadDestination {
        UploadDestination {
            bucket: self.bucket.clone(),
            region: self.region.clone(),
            prefix: self.prefix.clone(),
            key: key.to_string(),
        }
    }
}

impl From<&StorageConfig> for BackupTarget {
    fn from(config: &StorageConfig) -> Self {
        Self {
            bucket: config.bucket.clone(),
            region: config.region.clone(),
            prefix: config.prefix.clone(),
        }
    }
}

/// Generic artifact store
///
/// One call writes one artifact. No read-back is performed; success is
/// the absence of an error.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Upload the artifact's whole content
    ///
    /// The cursor position is not significant: backends either rewind the
    /// handle first or reopen the file by path.
    async fn put(
        &self,
        artifact: &mut ScopedArtifact,
        destination: &UploadDestination,
    ) -> Result<(), UploadError>;

    /// Get backend type identifier
    fn backend_type(&self) -> &str;
}

/// Join a key prefix and a key with a single `/`
pub fn object_key(prefix: &str, key: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}/{}", prefix, key)
    }
}
