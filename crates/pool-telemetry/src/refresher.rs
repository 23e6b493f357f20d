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

//! Keeps the latest [PoolSnapshot] in memory and rebuilds it on an interval.

use std::{sync::Arc, time::Duration};

use tokio::{sync::RwLock, time::MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::pipeline::{PoolSnapshot, PoolTelemetry};

pub struct CachedSnapshot {
    telemetry: PoolTelemetry,
    cache: RwLock<Option<Arc<PoolSnapshot>>>,
    refresh_interval: Duration,
}

impl CachedSnapshot {
    pub fn new(telemetry: PoolTelemetry) -> Self {
        let config = telemetry.config();
        let refresh_interval = config.refresh_interval();
        if refresh_interval.as_secs() != config.refresh_interval_secs {
            tracing::warn!(
                "refresh_interval_secs = {} is too short, refreshing every {}s",
                config.refresh_interval_secs,
                refresh_interval.as_secs()
            );
        }
        Self { telemetry, cache: RwLock::new(None), refresh_interval }
    }

    /// Latest cached snapshot, `None` until the first refresh finishes
    pub async fn latest(&self) -> Option<Arc<PoolSnapshot>> {
        self.cache.read().await.clone()
    }

    /// Run the pipeline once and cache the result.
    ///
    /// A run in which no target succeeded does not replace an existing
    /// snapshot. Returns whichever snapshot is cached afterwards.
    pub async fn refresh(&self) -> Arc<PoolSnapshot> {
        let snapshot = Arc::new(self.telemetry.run().await);
        let mut cache = self.cache.write().await;

        match cache.as_ref() {
            Some(previous) if snapshot.sources.succeeded == 0 => {
                tracing::warn!(
                    "All {} targets failed, keeping snapshot from {}",
                    snapshot.sources.attempted,
                    previous.last_updated.to_rfc3339()
                );
                previous.clone()
            }
            _ => {
                tracing::debug!("Cached snapshot from {}", snapshot.last_updated.to_rfc3339());
                *cache = Some(snapshot.clone());
                snapshot
            }
        }
    }

    /// Spawn background refresh task
    ///
    /// Refreshes immediately and then once per interval until `cancel_token`
    /// fires.
    pub fn spawn_refresh_task(
        self: Arc<Self>,
        cancel_token: CancellationToken,
    ) -> tokio::task::JoinHandle<()> {
        let this = self;

        tokio::spawn(async move {
            tracing::info!(
                "Telemetry refresh task started (interval: {}s)",
                this.refresh_interval.as_secs()
            );

            let mut ticker = tokio::time::interval(this.refresh_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;

                    _ = cancel_token.cancelled() => {
                        tracing::info!("Telemetry refresh task shutting down");
                        break;
                    }

                    // First tick completes immediately
                    _ = ticker.tick() => {
                        let snapshot = this.refresh().await;
                        tracing::info!(
                            "Snapshot {}: {} workers, {} active connections",
                            snapshot.last_updated.to_rfc3339(),
                            snapshot.aggregate.summary.total_workers,
                            snapshot.aggregate.summary.total_active_connections,
                        );
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

    use indexmap::IndexMap;
    use serde_json::{json, Value};
    use tracing_test::traced_test;

    use crate::config::TelemetryConfig;
    use crate::sources::{FetchError, PoolSource};
    use crate::targets::FetchTarget;

    /// Serves one summary document whose worker count follows the call count
    struct CountingSource {
        calls: Arc<AtomicU64>,
        should_error: AtomicBool,
    }

    impl CountingSource {
        fn new() -> Self {
            Self { calls: Arc::new(AtomicU64::new(0)), should_error: AtomicBool::new(false) }
        }
    }

    #[async_trait::async_trait]
    impl PoolSource for CountingSource {
        fn locate(&self, target: &FetchTarget) -> String {
            target.to_string()
        }

        async fn fetch(&self, target: &FetchTarget) -> Result<Value, FetchError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.should_error.load(Ordering::SeqCst) {
                return Err(FetchError::Status { url: target.to_string(), status: 503 });
            }
            Ok(json!({ "data": { "workers": {}, "aggregates": { "total_workers": call } } }))
        }
    }

    fn cached(source: Arc<CountingSource>, interval_secs: u64) -> Arc<CachedSnapshot> {
        let config = TelemetryConfig {
            base_url: "https://metrics.example.com".into(),
            endpoints: vec!["worker_summary".into()],
            region_node_map: IndexMap::from([("us-central".into(), vec!["transcode".into()])]),
            refresh_interval_secs: interval_secs,
            ..Default::default()
        };
        Arc::new(CachedSnapshot::new(PoolTelemetry::with_source(config, source)))
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn latest_is_empty_before_first_refresh() {
        let cache = cached(Arc::new(CountingSource::new()), 60);
        assert!(cache.latest().await.is_none());

        let snapshot = cache.refresh().await;
        assert_eq!(snapshot.aggregate.summary.total_workers, 1);
        assert_eq!(cache.latest().await.unwrap().aggregate.summary.total_workers, 1);
    }

    #[tokio::test]
    #[traced_test]
    async fn failed_run_keeps_previous_snapshot() {
        let source = Arc::new(CountingSource::new());
        let cache = cached(source.clone(), 60);

        cache.refresh().await;
        source.should_error.store(true, Ordering::SeqCst);
        let kept = cache.refresh().await;

        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
        assert_eq!(kept.aggregate.summary.total_workers, 1);
        assert_eq!(kept.sources.succeeded, 1);
        assert!(logs_contain("keeping snapshot from"));
    }

    #[tokio::test]
    async fn failed_first_run_is_cached() {
        let source = Arc::new(CountingSource::new());
        source.should_error.store(true, Ordering::SeqCst);
        let cache = cached(source, 60);

        let snapshot = cache.refresh().await;
        assert_eq!(snapshot.sources.failed, 1);
        assert_eq!(snapshot.aggregate.summary.total_workers, 0);
        assert!(cache.latest().await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_task_runs_periodically() {
        let source = Arc::new(CountingSource::new());
        let cache = cached(source.clone(), 1);

        let cancel_token = CancellationToken::new();
        let handle = cache.clone().spawn_refresh_task(cancel_token.clone());

        settle().await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(1)).await;
        settle().await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.latest().await.unwrap().aggregate.summary.total_workers, 2);

        cancel_token.cancel();
        handle.await.unwrap();

        tokio::time::advance(Duration::from_secs(5)).await;
        settle().await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    #[traced_test]
    async fn zero_interval_is_clamped() {
        let source = Arc::new(CountingSource::new());
        let cache = cached(source.clone(), 0);
        assert!(logs_contain("refreshing every 1s"));

        let cancel_token = CancellationToken::new();
        let handle = cache.clone().spawn_refresh_task(cancel_token.clone());

        settle().await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(1)).await;
        settle().await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);

        cancel_token.cancel();
        assert!(handle.await.is_ok());
    }
}
