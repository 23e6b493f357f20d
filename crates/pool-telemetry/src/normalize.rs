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

//! Turns one settled fetch into a [SourceDelta]: the typed records and raw
//! counters that document contributes to the pool.

use alloy::primitives::U256;
use serde_json::Value;

use crate::payload::{
    decode, decode_rows, RawAiPerformance, RawTranscodePerformance, RawWorker,
    WorkerPerformanceDoc, WorkerSummaryDoc,
};
use crate::records::{
    AiPerformance, PerformanceRecord, TranscodePerformance, WorkerConnectionRecord,
    WorkerFeeRecord, UNKNOWN,
};
use crate::targets::{EndpointKind, FetchTarget, NodeKind};

/// Raw (pre-division) totals reported by a source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SummaryCounters {
    pub workers: u64,
    pub connections: u64,
    pub pending_fees: U256,
    pub paid_fees: U256,
}

impl SummaryCounters {
    pub fn add(&mut self, other: &SummaryCounters) {
        self.workers = self.workers.saturating_add(other.workers);
        self.connections = self.connections.saturating_add(other.connections);
        self.pending_fees = self.pending_fees.saturating_add(other.pending_fees);
        self.paid_fees = self.paid_fees.saturating_add(other.paid_fees);
    }
}

/// Everything a single document contributes to the merged pool.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceDelta {
    /// Region of the target the document was fetched for
    pub region: String,
    pub fees: Vec<WorkerFeeRecord>,
    pub connections: Vec<WorkerConnectionRecord>,
    pub performance: Vec<PerformanceRecord>,
    /// Source aggregates, present only for summary documents with a worker map
    pub summary: Option<SummaryCounters>,
}

impl SourceDelta {
    fn empty(target: &FetchTarget) -> Self {
        Self { region: target.region.clone(), ..Default::default() }
    }
}

/// Dispatch on the target's endpoint and decode its document.
pub fn normalize(target: &FetchTarget, body: Value) -> SourceDelta {
    match &target.endpoint {
        EndpointKind::WorkerSummary => normalize_summary(target, decode(body)),
        EndpointKind::WorkerPerformance => normalize_performance(target, decode(body)),
        EndpointKind::Other(name) => {
            tracing::debug!("Ignoring document from unhandled endpoint {name} ({target})");
            SourceDelta::empty(target)
        }
    }
}

fn normalize_summary(target: &FetchTarget, doc: WorkerSummaryDoc) -> SourceDelta {
    let mut delta = SourceDelta::empty(target);

    let Some(data) = doc.data else {
        tracing::debug!("Summary document for {target} has no data section");
        return delta;
    };
    let Some(workers) = data.workers else {
        tracing::debug!("Summary document for {target} has no worker map");
        return delta;
    };

    for worker in decode_rows::<RawWorker>(workers) {
        let worker_id = worker.eth_address.unwrap_or_else(|| UNKNOWN.to_string());
        let region = worker.region.unwrap_or_else(|| target.region.clone());
        let node_type = worker.node_type.unwrap_or_else(|| target.node_type.to_string());

        delta.fees.push(WorkerFeeRecord {
            worker_id: worker_id.clone(),
            node_type: node_type.clone(),
            region: region.clone(),
            pending_fees: worker.pending_fees,
            paid_fees: worker.total_fees_paid,
            total_fees: worker.total_fees,
        });
        delta.connections.push(WorkerConnectionRecord {
            worker_id,
            node_type,
            region,
            connection_count: worker.connection_count,
        });
    }

    let aggregates = data.aggregates.unwrap_or_default();
    delta.summary = Some(SummaryCounters {
        workers: aggregates.total_workers,
        connections: aggregates.total_connections,
        pending_fees: aggregates.total_pending_fees,
        paid_fees: aggregates.total_fees_paid,
    });

    delta
}

fn normalize_performance(target: &FetchTarget, doc: WorkerPerformanceDoc) -> SourceDelta {
    let mut delta = SourceDelta::empty(target);

    match &target.node_type {
        NodeKind::Transcode => {
            let rows = doc.transcode_performance.unwrap_or_default();
            delta.performance = decode_rows::<RawTranscodePerformance>(rows)
                .into_iter()
                .map(|row| PerformanceRecord::Transcode(transcode_record(target, row)))
                .collect();
        }
        NodeKind::Ai => {
            let rows = doc.ai_performance.unwrap_or_default();
            delta.performance = decode_rows::<RawAiPerformance>(rows)
                .into_iter()
                .map(|row| PerformanceRecord::Ai(ai_record(target, row)))
                .collect();
        }
        NodeKind::Other(name) => {
            tracing::debug!("No performance parser for node type {name} ({target})");
        }
    }

    delta
}

fn transcode_record(target: &FetchTarget, row: RawTranscodePerformance) -> TranscodePerformance {
    TranscodePerformance {
        worker_id: row.worker_address.unwrap_or_else(|| UNKNOWN.to_string()),
        region: target.region.clone(),
        job_count: row.job_count,
        real_time_ratio_mean: row.mean_real_time_ratio,
        response_time_mean: row.mean_response_time.unwrap_or(0.0),
        median_compute_units_per_second: row.median_compute_units_per_second,
        mean_compute_units_per_second: row.mean_compute_units_per_second,
        min_compute_units_per_second: row.min_compute_units_per_second,
        max_compute_units_per_second: row.max_compute_units_per_second,
        total_compute_units: row.total_compute_units.unwrap_or(0.0),
        total_fees: row.total_fees,
    }
}

fn ai_record(target: &FetchTarget, row: RawAiPerformance) -> AiPerformance {
    AiPerformance {
        worker_id: row.worker_address.unwrap_or_else(|| UNKNOWN.to_string()),
        region: target.region.clone(),
        job_count: row.job_count,
        model_id: row.model_id.unwrap_or_else(|| UNKNOWN.to_string()),
        pipeline: row.pipeline.unwrap_or_else(|| UNKNOWN.to_string()),
        response_time_mean: row.mean_response_time.unwrap_or(0.0),
    }
}
