// Copyright 2026 Boundless Foundation, Inc.
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

use std::path::PathBuf;

use crate::sources::{FetchError, PoolSource};
use crate::targets::FetchTarget;

/// Reads `{root}/{region}/{node_type}/{endpoint}.json` from the local filesystem.
///
/// Useful against a mirrored copy of the published metrics tree.
pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, target: &FetchTarget) -> PathBuf {
        self.root
            .join(&target.region)
            .join(target.node_type.as_str())
            .join(format!("{}.json", target.endpoint))
    }
}

#[async_trait::async_trait]
impl PoolSource for FileSource {
    fn locate(&self, target: &FetchTarget) -> String {
        self.path_for(target).display().to_string()
    }

    async fn fetch(&self, target: &FetchTarget) -> Result<serde_json::Value, FetchError> {
        let path = self.path_for(target);
        let data = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| FetchError::Io { path: path.display().to_string(), source })?;
        serde_json::from_str(&data).map_err(|e| FetchError::Decode {
            url: path.display().to_string(),
            message: e.to_string(),
        })
    }
}
