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

//! Settle-all fan-out over the fetch grid.

use futures::{future::join_all, stream, StreamExt};

use crate::sources::{FetchError, PoolSource};
use crate::targets::FetchTarget;

/// The settled outcome of one target. Failures are kept, not dropped, so the
/// caller sees every target exactly once.
#[derive(Debug)]
pub struct FetchOutcome {
    pub target: FetchTarget,
    pub result: Result<serde_json::Value, FetchError>,
}

impl FetchOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Fetch every target once and wait for all of them to settle.
///
/// With `max_concurrency` unset all requests are issued immediately; otherwise
/// at most that many are in flight. Outcomes are returned in target order
/// either way.
pub async fn fetch_all(
    source: &dyn PoolSource,
    targets: Vec<FetchTarget>,
    max_concurrency: Option<usize>,
) -> Vec<FetchOutcome> {
    let fetch_one = |target: FetchTarget| async move {
        let result = source.fetch(&target).await;
        if let Err(e) = &result {
            tracing::warn!("Failed to fetch {}: {}", source.locate(&target), e);
        }
        FetchOutcome { target, result }
    };

    match max_concurrency {
        Some(limit) => {
            stream::iter(targets).map(fetch_one).buffered(limit.max(1)).collect().await
        }
        None => join_all(targets.into_iter().map(fetch_one)).await,
    }
}
