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

use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::sources::{FetchError, PoolSource};
use crate::targets::FetchTarget;

/// Fetches `{base}/{region}/{node_type}/{endpoint}.json` over HTTP(S)
pub struct HttpSource {
    client: Client,
    base_url: Url,
}

impl HttpSource {
    /// Create a new HTTP source rooted at `base_url`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| FetchError::InvalidLocation(format!("{base_url}: {e}")))?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }
}

#[async_trait::async_trait]
impl PoolSource for HttpSource {
    fn locate(&self, target: &FetchTarget) -> String {
        target.url(self.base_url.as_str())
    }

    async fn fetch(&self, target: &FetchTarget) -> Result<serde_json::Value, FetchError> {
        let url = self.locate(target);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { url, status: status.as_u16() });
        }

        response.json().await.map_err(|e| FetchError::Decode { url, message: e.to_string() })
    }
}
