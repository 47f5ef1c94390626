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

// Artifact store module
//
// Trait-based abstraction over the upload destination. S3 is the
// production backend; the filesystem backend mirrors the bucket layout
// on local disk.
//
// This module focuses on WRITE-ONLY operations.

pub mod backend;
pub mod factory;
pub mod filesystem;
pub mod s3;

pub use backend::{object_key, ArtifactStore, BackupTarget, UploadDestination};
pub use factory::StoreFactory;
pub use filesystem::FilesystemArtifactStore;
pub use s3::S3ArtifactStore;
