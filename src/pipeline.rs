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

// Backup pipeline: export -> fetch -> upload
//
// Stages run strictly in order and the first failure ends the run. The
// downloaded artifact is owned here and removed once the upload stage
// completes, whatever its outcome.

use crate::broker::ExportApi;
use crate::error::BackupError;
use crate::storage::{ArtifactStore, BackupTarget};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Exporting,
    Fetching,
    Uploading,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Exporting => "exporting",
            PipelineStage::Fetching => "fetching",
            PipelineStage::Uploading => "uploading",
        };
        f.write_str(name)
    }
}

/// Outcome of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupReport {
    /// Cluster member that produced the export
    pub node: String,
    /// File name assigned by the broker
    pub remote_filename: String,
    /// Name of the local artifact, also the last key segment
    pub local_name: String,
    /// Where the artifact lived before it was removed
    pub local_path: PathBuf,
    pub bucket: String,
    pub object_key: String,
    pub bytes: u64,
}

pub struct BackupPipeline {
    exporter: Arc<dyn ExportApi>,
    store: Arc<dyn ArtifactStore>,
    target: BackupTarget,
}

impl BackupPipeline {
    pub fn new(
        exporter: Arc<dyn ExportApi>,
        store: Arc<dyn ArtifactStore>,
        target: BackupTarget,
    ) -> Self {
        Self {
            exporter,
            store,
            target,
        }
    }

    /// Run one backup
    ///
    /// Every call triggers a fresh export job on the broker.
    pub async fn run(&self) -> Result<BackupReport, BackupError> {
        info!("Requesting data export");
        let job = self
            .exporter
            .export()
            .await
            .map_err(|e| fail(PipelineStage::Exporting, e))?;
        info!("Data exported to file: {} (node {})", job.filename, job.node);

        let mut artifact = self
            .exporter
            .fetch(&job.filename, &job.node)
            .await
            .map_err(|e| fail(PipelineStage::Fetching, e))?;
        info!("Data downloaded to file: {}", artifact.path().display());

        let local_name = artifact.file_name();
        let destination = self.target.destination_for(&local_name);
        let uploaded = self.store.put(&mut artifact, &destination).await;

        let report = BackupReport {
            node: job.node,
            remote_filename: job.filename,
            local_name,
            local_path: artifact.path().to_path_buf(),
            bucket: destination.bucket.clone(),
            object_key: destination.object_key(),
            bytes: artifact.len(),
        };

        if let Err(e) = artifact.release() {
            warn!(
                "Failed to remove local artifact {}: {}",
                report.local_path.display(),
                e
            );
        }

        uploaded.map_err(|e| fail(PipelineStage::Uploading, e))?;

        info!(
            "Data uploaded to {} backend: {}/{}",
            self.store.backend_type(),
            report.bucket,
            report.object_key
        );
        Ok(report)
    }
}

fn fail<E: Into<BackupError>>(stage: PipelineStage, err: E) -> BackupError {
    let err = err.into();
    debug!("Backup stopped while {}: {}", stage, err);
    err
}
