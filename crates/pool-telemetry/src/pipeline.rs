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

//! One end to end telemetry run: enumerate targets, fetch them all, fold the
//! settled documents into a pool and project it for display.

use std::{sync::Arc, time::Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::aggregate::{aggregate, PoolAggregate};
use crate::config::{ConfigErr, TelemetryConfig};
use crate::errors::CodedError;
use crate::fetcher::fetch_all;
use crate::impl_coded_debug;
use crate::merge::merge;
use crate::normalize::normalize;
use crate::sources::{source_for, FetchError, PoolSource};
use crate::targets::enumerate_targets;
use crate::ui::{build_ui, UiViews};

#[derive(Error)]
pub enum PipelineErr {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigErr),

    #[error("Failed to build telemetry source: {0}")]
    Source(#[from] FetchError),
}

impl_coded_debug!(PipelineErr);

impl CodedError for PipelineErr {
    fn code(&self) -> &str {
        match self {
            PipelineErr::Config(e) => e.code(),
            PipelineErr::Source(e) => e.code(),
        }
    }
}

/// How many targets a run attempted and how they settled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SourceStats {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Result of a single run, immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoolSnapshot {
    #[serde(flatten)]
    pub aggregate: PoolAggregate,
    pub ui: UiViews,
    pub sources: SourceStats,
    pub last_updated: DateTime<Utc>,
}

impl PoolSnapshot {
    fn from_aggregate(aggregate: PoolAggregate, sources: SourceStats) -> Self {
        let ui = build_ui(&aggregate);
        Self { aggregate, ui, sources, last_updated: Utc::now() }
    }

    /// All-zero snapshot with fully populated, empty views.
    pub fn empty() -> Self {
        Self::from_aggregate(PoolAggregate::default(), SourceStats::default())
    }
}

/// Runs the telemetry pipeline against a single source.
pub struct PoolTelemetry {
    config: TelemetryConfig,
    source: Arc<dyn PoolSource>,
}

impl PoolTelemetry {
    /// Validate `config` and resolve its base URL to a source.
    pub fn from_config(config: TelemetryConfig) -> Result<Self, PipelineErr> {
        config.validate()?;
        let source = source_for(&config.base_url, config.request_timeout())?;
        Ok(Self { config, source })
    }

    pub fn with_source(config: TelemetryConfig, source: Arc<dyn PoolSource>) -> Self {
        Self { config, source }
    }

    pub fn config(&self) -> &TelemetryConfig {
        &self.config
    }

    /// Execute one independent run. Failed targets are logged and left out;
    /// the run itself never fails.
    pub async fn run(&self) -> PoolSnapshot {
        let started = Instant::now();
        let targets = enumerate_targets(&self.config);
        if targets.is_empty() {
            tracing::warn!("No fetch targets configured, returning an empty snapshot");
        }

        let attempted = targets.len();
        let outcomes =
            fetch_all(self.source.as_ref(), targets, self.config.max_concurrent_fetches).await;
        let succeeded = outcomes.iter().filter(|o| o.is_ok()).count();
        let sources = SourceStats { attempted, succeeded, failed: attempted - succeeded };

        let deltas = outcomes
            .into_iter()
            .filter_map(|outcome| outcome.result.ok().map(|body| normalize(&outcome.target, body)));
        let snapshot = PoolSnapshot::from_aggregate(aggregate(merge(deltas)), sources);

        tracing::info!(
            "Telemetry run complete: {}/{} targets succeeded, {} workers, \
             {} transcode / {} ai rows in {:?}",
            sources.succeeded,
            sources.attempted,
            snapshot.aggregate.summary.total_workers,
            snapshot.aggregate.transcode_performance.len(),
            snapshot.aggregate.ai_performance.len(),
            started.elapsed()
        );

        snapshot
    }
}

/// Run the pipeline once for `config`.
///
/// A missing or empty setting is logged and yields [PoolSnapshot::empty]
/// instead of an error.
pub async fn fetch_pool_details(config: &TelemetryConfig) -> PoolSnapshot {
    match PoolTelemetry::from_config(config.clone()) {
        Ok(telemetry) => telemetry.run().await,
        Err(e) => {
            tracing::error!("Cannot run telemetry pipeline: {e:?}");
            PoolSnapshot::empty()
        }
    }
}
