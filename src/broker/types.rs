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

use serde::{Deserialize, Serialize};

/// Configuration roots included in every export unless overridden
pub const DEFAULT_ROOT_KEYS: &[&str] = &[
    "connectors",
    "actions",
    "sources",
    "rule_engine",
    "schema_registry",
];

/// Built-in database tables included in every export unless overridden
pub const DEFAULT_TABLE_SETS: &[&str] = &[
    "banned",
    "builtin_authn",
    "builtin_authn_scram",
    "builtin_authz",
];

/// Body of `POST /api/v5/data/export`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRequest {
    #[serde(default = "default_root_keys")]
    pub root_keys: Vec<String>,

    #[serde(default = "default_table_sets")]
    pub table_sets: Vec<String>,
}

impl Default for ExportRequest {
    fn default() -> Self {
        Self {
            root_keys: default_root_keys(),
            table_sets: default_table_sets(),
        }
    }
}

impl ExportRequest {
    pub fn is_empty(&self) -> bool {
        self.root_keys.is_empty() && self.table_sets.is_empty()
    }
}

/// Export job acknowledgement: which node holds the file, and its name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportJobResult {
    pub node: String,
    pub filename: String,
}

/// Standard EMQX error body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub code: String,
    pub message: String,
}

fn default_root_keys() -> Vec<String> {
    DEFAULT_ROOT_KEYS.iter().map(|s| s.to_string()).collect()
}

fn default_table_sets() -> Vec<String> {
    DEFAULT_TABLE_SETS.iter().map(|s| s.to_string()).collect()
}
