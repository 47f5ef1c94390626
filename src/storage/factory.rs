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

// Store factory for creating artifact stores from configuration

use super::backend::ArtifactStore;
use super::filesystem::FilesystemArtifactStore;
use super::s3::S3ArtifactStore;
use crate::config::StorageConfig;
use crate::error::ConfigError;
use std::sync::Arc;

pub struct StoreFactory;

impl StoreFactory {
    /// Create artifact store from configuration
    pub fn create(config: &StorageConfig) -> Result<Arc<dyn ArtifactStore>, ConfigError> {
        match config.backend.as_str() {
            "s3" => Ok(Arc::new(S3ArtifactStore::new(config))),

            "filesystem" => {
                let fs_config = config
                    .filesystem
                    .as_ref()
                    .ok_or_else(|| ConfigError::Invalid("filesystem config missing".to_string()))?;

                Ok(Arc::new(FilesystemArtifactStore::new(fs_config)))
            }

            unknown => Err(ConfigError::Invalid(format!(
                "unknown storage backend: '{}'. Supported: s3, filesystem",
                unknown
            ))),
        }
    }
}
