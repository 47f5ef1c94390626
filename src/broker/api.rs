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

use super::types::ExportJobResult;
use crate::artifact::ScopedArtifact;
use crate::error::{BrokerError, FetchError};
use async_trait::async_trait;

/// Source of export artifacts
///
/// `ExportClient` is the HTTP implementation. Both calls are made on the
/// same instance during a run.
#[async_trait]
pub trait ExportApi: Send + Sync {
    /// Ask the broker to produce an export file
    async fn export(&self) -> Result<ExportJobResult, BrokerError>;

    /// Download `filename` from `node` into a local artifact, cursor at start
    async fn fetch(&self, filename: &str, node: &str) -> Result<ScopedArtifact, FetchError>;
}
