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

// Filesystem backend implementation

use super::backend::{ArtifactStore, UploadDestination};
use crate::artifact::ScopedArtifact;
use crate::config::FilesystemConfig;
use crate::error::UploadError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// Copies artifacts into a local directory tree laid out like the bucket
///
/// The object key maps to `base_path/<prefix>/<file name>`. Bucket and
/// region are ignored.
pub struct FilesystemArtifactStore {
    base_path: PathBuf,
}

impl FilesystemArtifactStore {
    pub fn new(config: &FilesystemConfig) -> Self {
        let base_path = PathBuf::from(&config.base_path);
        info!(
            "Initializing filesystem backend at: {}",
            base_path.display()
        );
        Self { base_path }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Local path the object key maps to
    pub fn target_path(&self, destination: &UploadDestination) -> PathBuf {
        self.base_path.join(destination.object_key())
    }
}

fn io_error(action: &'static str, path: &Path) -> impl FnOnce(std::io::Error) -> UploadError {
    let path = path.to_path_buf();
    move |source| UploadError::Io {
        action,
        path,
        source,
    }
}

#[async_trait]
impl ArtifactStore for FilesystemArtifactStore {
    async fn put(
        &self,
        artifact: &mut ScopedArtifact,
        destination: &UploadDestination,
    ) -> Result<(), UploadError> {
        let target = self.target_path(destination);

        artifact
            .rewind()
            .await
            .map_err(io_error("rewind", artifact.path()))?;

        if let Some(parent) = target.parent() {
            debug!("Creating directory: {}", parent.display());
            fs::create_dir_all(parent)
                .await
                .map_err(io_error("create directory", parent))?;
        }

        let mut file = fs::File::create(&target)
            .await
            .map_err(io_error("create", &target))?;

        let written = tokio::io::copy(artifact.file_mut(), &mut file)
            .await
            .map_err(io_error("write", &target))?;

        file.flush().await.map_err(io_error("flush", &target))?;

        info!(
            "Successfully wrote {} bytes to {}",
            written,
            target.display()
        );
        Ok(())
    }

    fn backend_type(&self) -> &str {
        "filesystem"
    }
}
