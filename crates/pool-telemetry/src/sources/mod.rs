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

/// Error types for telemetry sources
pub mod error;
/// Directory backed source for mirrored or archived documents
pub mod file;
/// HTTP source for the published metrics documents
pub mod http;

pub use error::FetchError;
pub use file::FileSource;
pub use http::HttpSource;

use std::{sync::Arc, time::Duration};

use crate::targets::FetchTarget;

/// A place telemetry documents can be fetched from.
///
/// Implementations resolve a [FetchTarget] to its JSON document. Every call is
/// independent; implementations must not retry.
#[async_trait::async_trait]
pub trait PoolSource: Send + Sync {
    /// Human readable location of `target`, used in logs
    fn locate(&self, target: &FetchTarget) -> String;

    /// Fetch and decode the document for `target`
    async fn fetch(&self, target: &FetchTarget) -> Result<serde_json::Value, FetchError>;
}

/// Pick a source for `base_url`: `file://` locations read from disk, anything
/// else is fetched over HTTP.
pub fn source_for(base_url: &str, timeout: Duration) -> Result<Arc<dyn PoolSource>, FetchError> {
    if let Some(path) = base_url.strip_prefix("file://") {
        return Ok(Arc::new(FileSource::new(path)));
    }
    Ok(Arc::new(HttpSource::new(base_url, timeout)?))
}
