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

//! Summary statistics, rankings and distributions over a merged pool.

use std::collections::{BTreeMap, HashMap, HashSet};

use alloy::primitives::U256;
use indexmap::IndexMap;
use serde::Serialize;

use crate::merge::MergedPool;
use crate::normalize::SummaryCounters;
use crate::records::{
    serialize_wei, AiPerformance, TranscodePerformance, WorkerConnectionRecord, WorkerFeeRecord,
};

/// Maximum entries kept in each ranking.
pub const RANKING_LIMIT: usize = 10;
/// Histogram step for compute units per second.
pub const COMPUTE_UNITS_BUCKET_STEP: f64 = 50_000_000.0;
/// Histogram step for the real-time ratio.
pub const REAL_TIME_RATIO_BUCKET_STEP: f64 = 5.0;

/// Totals and per-worker averages. Fee values are in wei; averages round down.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregateSummary {
    pub total_workers: u64,
    pub total_active_connections: u64,
    #[serde(serialize_with = "serialize_wei")]
    pub total_pending_fees: U256,
    #[serde(serialize_with = "serialize_wei")]
    pub total_paid_fees: U256,
    #[serde(serialize_with = "serialize_wei")]
    pub average_pending_per_worker: U256,
    #[serde(serialize_with = "serialize_wei")]
    pub average_paid_per_worker: U256,
}

impl AggregateSummary {
    pub fn from_counters(counters: &SummaryCounters) -> Self {
        let (average_pending_per_worker, average_paid_per_worker) = if counters.workers == 0 {
            (U256::ZERO, U256::ZERO)
        } else {
            let workers = U256::from(counters.workers);
            (counters.pending_fees / workers, counters.paid_fees / workers)
        };

        Self {
            total_workers: counters.workers,
            total_active_connections: counters.connections,
            total_pending_fees: counters.pending_fees,
            total_paid_fees: counters.paid_fees,
            average_pending_per_worker,
            average_paid_per_worker,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeeRanking {
    #[serde(rename = "eth_address")]
    pub worker_id: String,
    #[serde(serialize_with = "serialize_wei")]
    pub total_fees: U256,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscodeRanking {
    #[serde(rename = "eth_address")]
    pub worker_id: String,
    pub avg_real_time_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AiRanking {
    #[serde(rename = "eth_address")]
    pub worker_id: String,
    pub model_id: String,
    pub avg_response_time: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WorkerRankings {
    pub by_fees: Vec<FeeRanking>,
    pub by_transcode_performance: Vec<TranscodeRanking>,
    pub by_ai_response_time: Vec<AiRanking>,
}

/// Workers by total fees summed over every (region, node type) they appear in,
/// highest first.
pub fn rank_by_fees(fees: &[WorkerFeeRecord]) -> Vec<FeeRanking> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<FeeRanking> = Vec::new();

    for record in fees {
        match index.get(record.worker_id.as_str()) {
            Some(&i) => {
                totals[i].total_fees = totals[i].total_fees.saturating_add(record.total_fees)
            }
            None => {
                index.insert(&record.worker_id, totals.len());
                totals.push(FeeRanking {
                    worker_id: record.worker_id.clone(),
                    total_fees: record.total_fees,
                });
            }
        }
    }

    totals.sort_by(|a, b| b.total_fees.cmp(&a.total_fees));
    totals.truncate(RANKING_LIMIT);
    totals
}

/// Transcode rows by real-time ratio, highest first.
///
/// Rows without a reported ratio are not ranked.
pub fn rank_by_transcode_speed(performance: &[TranscodePerformance]) -> Vec<TranscodeRanking> {
    let mut ranking: Vec<TranscodeRanking> = performance
        .iter()
        .filter_map(|p| {
            p.real_time_ratio_mean.map(|ratio| TranscodeRanking {
                worker_id: p.worker_id.clone(),
                avg_real_time_ratio: ratio,
            })
        })
        .collect();

    ranking.sort_by(|a, b| b.avg_real_time_ratio.total_cmp(&a.avg_real_time_ratio));
    ranking.truncate(RANKING_LIMIT);
    ranking
}

/// AI rows by mean response time, fastest first.
pub fn rank_by_ai_response_time(performance: &[AiPerformance]) -> Vec<AiRanking> {
    let mut ranking: Vec<AiRanking> = performance
        .iter()
        .map(|p| AiRanking {
            worker_id: p.worker_id.clone(),
            model_id: p.model_id.clone(),
            avg_response_time: p.response_time_mean,
        })
        .collect();

    ranking.sort_by(|a, b| a.avg_response_time.total_cmp(&b.avg_response_time));
    ranking.truncate(RANKING_LIMIT);
    ranking
}

/// Sum of job counts, saturating at `u64::MAX`.
pub fn total_jobs(job_counts: impl IntoIterator<Item = u64>) -> u64 {
    job_counts.into_iter().fold(0, u64::saturating_add)
}

/// Job-count weighted mean of `(value, job_count)` samples.
///
/// The denominator is clamped to 1, so zero total jobs yields 0.
pub fn weighted_average(samples: impl IntoIterator<Item = (f64, u64)>) -> f64 {
    let (weighted_sum, total_jobs) = samples
        .into_iter()
        .fold((0.0, 0u64), |(sum, jobs), (value, count)| {
            (sum + value * count as f64, jobs.saturating_add(count))
        });
    weighted_sum / total_jobs.max(1) as f64
}

/// Median with the even-length midpoint rule; 0 for no values.
pub fn median(mut values: Vec<f64>) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        values[mid]
    } else {
        (values[mid - 1] + values[mid]) / 2.0
    }
}

fn min_or_zero(values: impl IntoIterator<Item = f64>) -> f64 {
    values.into_iter().reduce(f64::min).unwrap_or(0.0)
}

fn max_or_zero(values: impl IntoIterator<Item = f64>) -> f64 {
    values.into_iter().reduce(f64::max).unwrap_or(0.0)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionBucket {
    pub bucket_start: f64,
    pub count: usize,
}

/// Fixed-width histogram: each value lands in `floor(value / step) * step`.
/// Buckets are emitted in ascending order and only when non-empty.
pub fn histogram(values: impl IntoIterator<Item = f64>, step: f64) -> Vec<DistributionBucket> {
    let mut buckets: BTreeMap<i64, usize> = BTreeMap::new();
    for value in values {
        *buckets.entry((value / step).floor() as i64).or_default() += 1;
    }
    buckets
        .into_iter()
        .map(|(index, count)| DistributionBucket { bucket_start: index as f64 * step, count })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TranscodeStats {
    pub total_workers: usize,
    pub total_regions: usize,
    pub total_jobs: u64,
    pub avg_real_time_ratio: f64,
    pub median_real_time_ratio: f64,
    pub min_real_time_ratio: f64,
    pub max_real_time_ratio: f64,
    pub real_time_ratio_distribution: Vec<DistributionBucket>,
    pub avg_compute_units_per_second: f64,
    pub median_compute_units_per_second: f64,
    pub min_compute_units_per_second: f64,
    pub max_compute_units_per_second: f64,
    pub compute_units_distribution: Vec<DistributionBucket>,
}

pub fn transcode_stats(performance: &[TranscodePerformance]) -> TranscodeStats {
    let regions: HashSet<&str> = performance.iter().map(|p| p.region.as_str()).collect();
    let ratios: Vec<f64> = performance.iter().filter_map(|p| p.real_time_ratio_mean).collect();

    // Compute unit statistics only cover rows reporting both median and mean.
    let compute: Vec<&TranscodePerformance> = performance
        .iter()
        .filter(|p| {
            p.median_compute_units_per_second.is_some()
                && p.mean_compute_units_per_second.is_some()
        })
        .collect();
    let compute_means: Vec<f64> =
        compute.iter().filter_map(|p| p.mean_compute_units_per_second).collect();

    TranscodeStats {
        total_workers: performance.len(),
        total_regions: regions.len(),
        total_jobs: total_jobs(performance.iter().map(|p| p.job_count)),
        avg_real_time_ratio: weighted_average(
            performance.iter().map(|p| (p.real_time_ratio_mean.unwrap_or(0.0), p.job_count)),
        ),
        median_real_time_ratio: median(ratios.clone()),
        min_real_time_ratio: min_or_zero(ratios.iter().copied()),
        max_real_time_ratio: max_or_zero(ratios.iter().copied()),
        real_time_ratio_distribution: histogram(ratios, REAL_TIME_RATIO_BUCKET_STEP),
        avg_compute_units_per_second: weighted_average(
            compute.iter().map(|p| (p.mean_compute_units_per_second.unwrap_or(0.0), p.job_count)),
        ),
        median_compute_units_per_second: median(
            compute.iter().filter_map(|p| p.median_compute_units_per_second).collect(),
        ),
        min_compute_units_per_second: min_or_zero(
            compute.iter().map(|p| p.min_compute_units_per_second.unwrap_or(0.0)),
        ),
        max_compute_units_per_second: max_or_zero(
            compute.iter().map(|p| p.max_compute_units_per_second.unwrap_or(0.0)),
        ),
        compute_units_distribution: histogram(compute_means, COMPUTE_UNITS_BUCKET_STEP),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AiStats {
    pub total_ai_workers: usize,
    pub total_models: usize,
    pub total_jobs: u64,
    /// Job weighted, nanoseconds
    pub avg_response_time: f64,
}

pub fn ai_stats(performance: &[AiPerformance]) -> AiStats {
    let models: HashSet<&str> = performance.iter().map(|p| p.model_id.as_str()).collect();
    AiStats {
        total_ai_workers: performance.len(),
        total_models: models.len(),
        total_jobs: total_jobs(performance.iter().map(|p| p.job_count)),
        avg_response_time: weighted_average(
            performance.iter().map(|p| (p.response_time_mean, p.job_count)),
        ),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PoolStats {
    pub transcode: TranscodeStats,
    pub ai: AiStats,
}

/// The aggregated, read-only model handed to consumers.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PoolAggregate {
    pub summary: AggregateSummary,
    pub regions: IndexMap<String, AggregateSummary>,
    pub worker_fees: Vec<WorkerFeeRecord>,
    pub worker_connections: Vec<WorkerConnectionRecord>,
    pub worker_rankings: WorkerRankings,
    pub transcode_performance: Vec<TranscodePerformance>,
    pub ai_performance: Vec<AiPerformance>,
    pub stats: PoolStats,
}

pub fn aggregate(pool: MergedPool) -> PoolAggregate {
    let worker_rankings = WorkerRankings {
        by_fees: rank_by_fees(&pool.worker_fees),
        by_transcode_performance: rank_by_transcode_speed(&pool.transcode_performance),
        by_ai_response_time: rank_by_ai_response_time(&pool.ai_performance),
    };
    let stats = PoolStats {
        transcode: transcode_stats(&pool.transcode_performance),
        ai: ai_stats(&pool.ai_performance),
    };

    PoolAggregate {
        summary: AggregateSummary::from_counters(&pool.global),
        regions: pool
            .regions
            .iter()
            .map(|(region, counters)| (region.clone(), AggregateSummary::from_counters(counters)))
            .collect(),
        worker_fees: pool.worker_fees,
        worker_connections: pool.worker_connections,
        worker_rankings,
        transcode_performance: pool.transcode_performance,
        ai_performance: pool.ai_performance,
        stats,
    }
}
