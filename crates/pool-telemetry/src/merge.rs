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

//! Folds per-source deltas into one pool, deduplicating fee and connection
//! records on [WorkerIdentity]. The first record seen for an identity wins;
//! later duplicates are dropped, not merged.

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::normalize::{SourceDelta, SummaryCounters};
use crate::records::{
    AiPerformance, PerformanceRecord, TranscodePerformance, WorkerConnectionRecord,
    WorkerFeeRecord, WorkerIdentity,
};

#[derive(Debug, Clone, Default)]
pub struct MergedPool {
    pub worker_fees: Vec<WorkerFeeRecord>,
    pub worker_connections: Vec<WorkerConnectionRecord>,
    pub transcode_performance: Vec<TranscodePerformance>,
    pub ai_performance: Vec<AiPerformance>,
    /// Source aggregates summed across every summary document
    pub global: SummaryCounters,
    /// Source aggregates summed per target region, in first-seen order
    pub regions: IndexMap<String, SummaryCounters>,
    seen_fees: HashSet<WorkerIdentity>,
    seen_connections: HashSet<WorkerIdentity>,
}

impl MergedPool {
    /// Reducer step: fold one delta into the pool.
    pub fn absorb(mut self, delta: SourceDelta) -> Self {
        for record in delta.fees {
            if self.seen_fees.insert(record.identity()) {
                self.worker_fees.push(record);
            } else {
                tracing::trace!("Dropping duplicate fee record for {}", record.worker_id);
            }
        }

        for record in delta.connections {
            if self.seen_connections.insert(record.identity()) {
                self.worker_connections.push(record);
            } else {
                tracing::trace!("Dropping duplicate connection record for {}", record.worker_id);
            }
        }

        for record in delta.performance {
            match record {
                PerformanceRecord::Transcode(p) => self.transcode_performance.push(p),
                PerformanceRecord::Ai(p) => self.ai_performance.push(p),
            }
        }

        if let Some(counters) = delta.summary {
            self.global.add(&counters);
            self.regions.entry(delta.region).or_default().add(&counters);
        }

        self
    }
}

/// Fold deltas, in order, into a fresh pool.
pub fn merge(deltas: impl IntoIterator<Item = SourceDelta>) -> MergedPool {
    deltas.into_iter().fold(MergedPool::default(), MergedPool::absorb)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::U256;
    use proptest::prelude::*;

    fn fee(worker: &str, region: &str, node_type: &str, total: u64) -> WorkerFeeRecord {
        WorkerFeeRecord {
            worker_id: worker.into(),
            node_type: node_type.into(),
            region: region.into(),
            pending_fees: U256::from(total / 2),
            paid_fees: U256::from(total / 2),
            total_fees: U256::from(total),
        }
    }

    fn conn(worker: &str, region: &str, node_type: &str, count: u64) -> WorkerConnectionRecord {
        WorkerConnectionRecord {
            worker_id: worker.into(),
            node_type: node_type.into(),
            region: region.into(),
            connection_count: count,
        }
    }

    #[test]
    fn first_write_wins_across_sources() {
        let first = SourceDelta {
            region: "us-central".into(),
            fees: vec![fee("0xa", "us-central", "transcode", 100)],
            connections: vec![conn("0xa", "us-central", "transcode", 1)],
            ..Default::default()
        };
        let second = SourceDelta {
            region: "us-central".into(),
            fees: vec![
                fee("0xa", "us-central", "transcode", 999),
                fee("0xa", "us-central", "ai", 5),
                fee("0xa", "eu-central", "transcode", 7),
            ],
            connections: vec![conn("0xa", "us-central", "transcode", 8)],
            ..Default::default()
        };

        let pool = merge([first, second]);
        assert_eq!(pool.worker_fees.len(), 3);
        assert_eq!(pool.worker_fees[0].total_fees, U256::from(100u64));
        assert_eq!(pool.worker_connections.len(), 1);
        assert_eq!(pool.worker_connections[0].connection_count, 1);
    }

    #[test]
    fn fee_and_connection_sets_are_independent() {
        let delta = SourceDelta {
            region: "r".into(),
            fees: vec![fee("0xa", "r", "t", 1)],
            connections: vec![conn("0xb", "r", "t", 1), conn("0xa", "r", "t", 2)],
            ..Default::default()
        };
        let pool = merge([delta]);
        assert_eq!(pool.worker_fees.len(), 1);
        assert_eq!(pool.worker_connections.len(), 2);
    }

    #[test]
    fn performance_rows_are_kept_without_dedup() {
        let row = TranscodePerformance {
            worker_id: "0xa".into(),
            region: "r".into(),
            job_count: 1,
            real_time_ratio_mean: Some(1.0),
            response_time_mean: 0.0,
            median_compute_units_per_second: None,
            mean_compute_units_per_second: None,
            min_compute_units_per_second: None,
            max_compute_units_per_second: None,
            total_compute_units: 0.0,
            total_fees: U256::ZERO,
        };
        let delta = SourceDelta {
            region: "r".into(),
            performance: vec![
                PerformanceRecord::Transcode(row.clone()),
                PerformanceRecord::Transcode(row),
            ],
            ..Default::default()
        };
        let pool = merge([delta]);
        assert_eq!(pool.transcode_performance.len(), 2);
        assert!(pool.ai_performance.is_empty());
    }

    #[test]
    fn summary_counters_roll_up_by_target_region() {
        let counters = SummaryCounters {
            workers: 2,
            connections: 3,
            pending_fees: U256::from(4u64),
            paid_fees: U256::from(5u64),
        };
        let deltas = vec![
            SourceDelta { region: "b".into(), summary: Some(counters), ..Default::default() },
            SourceDelta { region: "a".into(), summary: Some(counters), ..Default::default() },
            SourceDelta { region: "a".into(), summary: Some(counters), ..Default::default() },
            SourceDelta { region: "c".into(), summary: None, ..Default::default() },
        ];
        let pool = merge(deltas);

        assert_eq!(pool.global.workers, 6);
        assert_eq!(pool.global.paid_fees, U256::from(15u64));
        assert_eq!(pool.regions["a"].connections, 6);
        assert_eq!(pool.regions["b"].pending_fees, U256::from(4u64));
        assert!(!pool.regions.contains_key("c"));
        // Regions keep the order their first summary arrived in.
        assert_eq!(pool.regions.keys().collect::<Vec<_>>(), ["b", "a"]);
    }

    proptest! {
        #[test]
        fn merged_identities_are_unique(
            rows in prop::collection::vec((0u8..5, 0u8..3, 0u8..2, 0u64..1000), 0..60),
            split in 0usize..60,
        ) {
            let records: Vec<_> = rows
                .iter()
                .map(|(w, r, n, v)| fee(&format!("0x{w}"), &format!("r{r}"), &format!("n{n}"), *v))
                .collect();
            let split = split.min(records.len());
            let deltas = vec![
                SourceDelta { fees: records[..split].to_vec(), ..Default::default() },
                SourceDelta { fees: records[split..].to_vec(), ..Default::default() },
            ];

            let pool = merge(deltas);
            let distinct: HashSet<_> = records.iter().map(WorkerFeeRecord::identity).collect();
            prop_assert_eq!(pool.worker_fees.len(), distinct.len());

            // Each kept record is the first occurrence of its identity.
            for kept in &pool.worker_fees {
                let first = records.iter().find(|r| r.identity() == kept.identity()).unwrap();
                prop_assert_eq!(first, kept);
            }
        }
    }
}
