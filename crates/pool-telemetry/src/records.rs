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

//! Typed records produced by the normalizer and merged across sources.

use alloy::primitives::U256;
use serde::{Serialize, Serializer};

/// Stand-in for string fields a source omitted.
pub const UNKNOWN: &str = "unknown";

/// Deduplication identity of a worker within the merged pool.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkerIdentity {
    pub worker_id: String,
    pub region: String,
    pub node_type: String,
}

/// Serialize a wei amount as a decimal string, which JSON numbers cannot hold
/// exactly.
pub fn serialize_wei<S: Serializer>(wei: &U256, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(wei)
}

/// Fees owed to and paid out to a worker, in the smallest fee unit (wei).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkerFeeRecord {
    #[serde(rename = "eth_address")]
    pub worker_id: String,
    pub node_type: String,
    pub region: String,
    #[serde(serialize_with = "serialize_wei")]
    pub pending_fees: U256,
    #[serde(serialize_with = "serialize_wei")]
    pub paid_fees: U256,
    #[serde(serialize_with = "serialize_wei")]
    pub total_fees: U256,
}

impl WorkerFeeRecord {
    pub fn identity(&self) -> WorkerIdentity {
        WorkerIdentity {
            worker_id: self.worker_id.clone(),
            region: self.region.clone(),
            node_type: self.node_type.clone(),
        }
    }
}

/// Active orchestrator connections held by a worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkerConnectionRecord {
    #[serde(rename = "eth_address")]
    pub worker_id: String,
    pub node_type: String,
    pub region: String,
    pub connection_count: u64,
}

impl WorkerConnectionRecord {
    pub fn identity(&self) -> WorkerIdentity {
        WorkerIdentity {
            worker_id: self.worker_id.clone(),
            region: self.region.clone(),
            node_type: self.node_type.clone(),
        }
    }
}

/// Transcode performance of one worker in one region.
///
/// Metrics a source may leave out stay `None` so statistics only cover the
/// rows that actually report them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscodePerformance {
    #[serde(rename = "eth_address")]
    pub worker_id: String,
    pub region: String,
    pub job_count: u64,
    #[serde(rename = "avg_real_time_ratio")]
    pub real_time_ratio_mean: Option<f64>,
    #[serde(rename = "avg_response_time")]
    pub response_time_mean: f64,
    pub median_compute_units_per_second: Option<f64>,
    pub mean_compute_units_per_second: Option<f64>,
    pub min_compute_units_per_second: Option<f64>,
    pub max_compute_units_per_second: Option<f64>,
    pub total_compute_units: f64,
    #[serde(serialize_with = "serialize_wei")]
    pub total_fees: U256,
}

/// AI inference performance of one worker for one model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AiPerformance {
    #[serde(rename = "eth_address")]
    pub worker_id: String,
    pub region: String,
    pub job_count: u64,
    pub model_id: String,
    pub pipeline: String,
    /// Nanoseconds
    #[serde(rename = "avg_response_time")]
    pub response_time_mean: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PerformanceRecord {
    Transcode(TranscodePerformance),
    Ai(AiPerformance),
}
