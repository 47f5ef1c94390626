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

// Broker export module
//
// Talks to the EMQX administrative API: triggers a data export job and
// downloads the produced file into a local scoped artifact.

pub mod api;
pub mod client;
pub mod types;

pub use api::ExportApi;
pub use client::{ExportClient, EXPORT_PATH, FILES_PATH};
pub use types::{ErrorEnvelope, ExportJobResult, ExportRequest, DEFAULT_ROOT_KEYS, DEFAULT_TABLE_SETS};
