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

//! Read-only, display-ready projections of a [PoolAggregate], one per
//! dashboard tab. Every builder here is a pure function of the aggregate.

mod ai;
pub mod format;
mod overview;
mod transcode;
mod workers;

use std::collections::HashMap;

use serde::Serialize;

use crate::aggregate::PoolAggregate;

pub use ai::{AiMetrics, AiPerformanceRow, AiRankingRow, AiView};
pub use overview::{OverviewSummary, OverviewView, RegionFees, TopWorkerByFees};
pub use transcode::{
    RegionPerformance, TopPerformer, TranscodeMetrics, TranscodeView, TranscodeWorkerRow,
};
pub use workers::{WorkerRow, WorkersView};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UiViews {
    pub overview: OverviewView,
    pub transcode: TranscodeView,
    pub ai: AiView,
    pub workers: WorkersView,
}

/// Chart entry: a label and how many items carry it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedCount {
    pub name: String,
    pub count: usize,
}

pub fn build_ui(aggregate: &PoolAggregate) -> UiViews {
    UiViews {
        overview: overview::build(aggregate),
        transcode: transcode::build(aggregate),
        ai: ai::build(aggregate),
        workers: workers::build(aggregate),
    }
}

/// Count items per label, labels in first-seen order.
fn count_by<'a>(labels: impl IntoIterator<Item = &'a str>) -> Vec<NamedCount> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<NamedCount> = Vec::new();
    for label in labels {
        match index.get(label) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(label, counts.len());
                counts.push(NamedCount { name: label.to_string(), count: 1 });
            }
        }
    }
    counts
}

#[cfg(test)]
pub(crate) mod fixtures {
    use alloy::primitives::U256;

    use crate::aggregate::{aggregate, PoolAggregate};
    use crate::merge::merge;
    use crate::normalize::{SourceDelta, SummaryCounters};
    use crate::records::{
        AiPerformance, PerformanceRecord, TranscodePerformance, WorkerConnectionRecord,
        WorkerFeeRecord,
    };

    pub const ADDR_A: &str = "0xaaaa00000000000000000000000000000000aaaa";
    pub const ADDR_B: &str = "0xbbbb00000000000000000000000000000000bbbb";
    pub const ADDR_C: &str = "0xcccc00000000000000000000000000000000cccc";

    pub fn fee(
        worker: &str,
        region: &str,
        node_type: &str,
        pending: u128,
        paid: u128,
    ) -> WorkerFeeRecord {
        WorkerFeeRecord {
            worker_id: worker.into(),
            node_type: node_type.into(),
            region: region.into(),
            pending_fees: U256::from(pending),
            paid_fees: U256::from(paid),
            total_fees: U256::from(pending + paid),
        }
    }

    pub fn connection(
        worker: &str,
        region: &str,
        node_type: &str,
        count: u64,
    ) -> WorkerConnectionRecord {
        WorkerConnectionRecord {
            worker_id: worker.into(),
            node_type: node_type.into(),
            region: region.into(),
            connection_count: count,
        }
    }

    pub fn transcode(worker: &str, region: &str, ratio: f64, jobs: u64) -> TranscodePerformance {
        TranscodePerformance {
            worker_id: worker.into(),
            region: region.into(),
            job_count: jobs,
            real_time_ratio_mean: Some(ratio),
            response_time_mean: 250.0,
            median_compute_units_per_second: Some(60e6),
            mean_compute_units_per_second: Some(75e6),
            min_compute_units_per_second: Some(10e6),
            max_compute_units_per_second: Some(120e6),
            total_compute_units: 1e9,
            total_fees: U256::ZERO,
        }
    }

    pub fn ai(worker: &str, region: &str, model: &str, response: f64, jobs: u64) -> AiPerformance {
        AiPerformance {
            worker_id: worker.into(),
            region: region.into(),
            job_count: jobs,
            model_id: model.into(),
            pipeline: "text-to-image".into(),
            response_time_mean: response,
        }
    }

    /// Two regions, three workers, both node kinds.
    pub fn sample_aggregate() -> PoolAggregate {
        const ETH: u128 = 1_000_000_000_000_000_000;
        let deltas = vec![
            SourceDelta {
                region: "us-central".into(),
                fees: vec![
                    fee(ADDR_A, "us-central", "transcode", ETH / 2, 2 * ETH),
                    fee(ADDR_B, "us-central", "transcode", 0, ETH),
                ],
                connections: vec![
                    connection(ADDR_A, "us-central", "transcode", 3),
                    connection(ADDR_B, "us-central", "transcode", 1),
                ],
                performance: vec![],
                summary: Some(SummaryCounters {
                    workers: 2,
                    connections: 4,
                    pending_fees: U256::from(ETH / 2),
                    paid_fees: U256::from(3 * ETH),
                }),
            },
            SourceDelta {
                region: "eu-central".into(),
                fees: vec![fee(ADDR_C, "eu-central", "ai", ETH, 0)],
                connections: vec![
                    connection(ADDR_C, "eu-central", "ai", 2),
                    connection(ADDR_A, "eu-central", "transcode", 5),
                ],
                performance: vec![],
                summary: Some(SummaryCounters {
                    workers: 1,
                    connections: 2,
                    pending_fees: U256::from(ETH),
                    paid_fees: U256::ZERO,
                }),
            },
            SourceDelta {
                region: "us-central".into(),
                performance: vec![
                    PerformanceRecord::Transcode(transcode(ADDR_A, "us-central", 12.0, 30)),
                    PerformanceRecord::Transcode(transcode(ADDR_B, "us-central", 4.0, 10)),
                ],
                ..Default::default()
            },
            SourceDelta {
                region: "eu-central".into(),
                performance: vec![
                    PerformanceRecord::Transcode(transcode(ADDR_A, "eu-central", 8.0, 2000)),
                    PerformanceRecord::Ai(ai(
                        ADDR_C,
                        "eu-central",
                        "ByteDance/SDXL-Lightning",
                        1.5e9,
                        4,
                    )),
                    PerformanceRecord::Ai(ai(ADDR_B, "eu-central", "openai/whisper", 4.0e8, 1)),
                ],
                ..Default::default()
            },
        ];
        aggregate(merge(deltas))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_is_deterministic() {
        let aggregate = fixtures::sample_aggregate();
        let first = serde_json::to_vec(&build_ui(&aggregate)).unwrap();
        let second = serde_json::to_vec(&build_ui(&aggregate)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_aggregate_yields_empty_views() {
        let views = build_ui(&PoolAggregate::default());
        let json = serde_json::to_value(&views).unwrap();

        assert_eq!(json["overview"]["region_data"], serde_json::json!([]));
        assert_eq!(json["overview"]["summary"]["total_paid_fees_formatted"], "0.000000");
        assert_eq!(json["transcode"]["grouped_by_region"], serde_json::json!([]));
        assert_eq!(json["transcode"]["metrics"]["avg_real_time_ratio"], "0.00");
        assert_eq!(json["ai"]["rankings"], serde_json::json!([]));
        assert_eq!(json["ai"]["metrics"]["avg_response_time"], "0.00 μs");
        assert_eq!(json["workers"]["workers_by_fees"], serde_json::json!([]));
        assert_eq!(json["workers"]["workers_by_connections"], serde_json::json!([]));
    }

    #[test]
    fn wei_amounts_serialize_as_decimal_strings() {
        let views = build_ui(&fixtures::sample_aggregate());
        let json = serde_json::to_value(&views).unwrap();
        assert_eq!(
            json["overview"]["top_workers_by_fees"][0]["total_fees"],
            "2500000000000000000"
        );
        assert_eq!(json["workers"]["workers_by_fees"][0]["pending_fees"], "500000000000000000");
    }

    #[test]
    fn count_by_keeps_first_seen_order() {
        let counts = count_by(["b", "a", "b", "c", "a", "b"]);
        assert_eq!(
            counts,
            vec![
                NamedCount { name: "b".into(), count: 3 },
                NamedCount { name: "a".into(), count: 2 },
                NamedCount { name: "c".into(), count: 1 },
            ]
        );
    }
}
