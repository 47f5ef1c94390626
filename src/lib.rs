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

// EMQX to S3 configuration backup
//
// One-shot tool that:
// - Triggers a data export on an EMQX cluster via its management API
// - Downloads the export file into a temporary local artifact
// - Uploads the artifact to an S3 bucket (or a local directory)
// - Removes the local artifact on every exit path

pub mod artifact;
pub mod broker;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod storage;

// Re-export main types
pub use artifact::ScopedArtifact;
pub use broker::{ExportApi, ExportClient, ExportJobResult, ExportRequest};
pub use config::{load_config, load_config_file, BackupConfig, ConfigLoader};
pub use error::{BackupError, BrokerError, ConfigError, FetchError, UploadError};
pub use pipeline::{BackupPipeline, BackupReport, PipelineStage};
pub use storage::{
    object_key, ArtifactStore, BackupTarget, FilesystemArtifactStore, S3ArtifactStore,
    StoreFactory, UploadDestination,
};
