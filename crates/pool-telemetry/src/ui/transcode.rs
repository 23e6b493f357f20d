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

use std::collections::HashMap;

use serde::Serialize;

use super::format::{format_with_commas, round_to, shorten_address};
use super::NamedCount;
use crate::aggregate::{total_jobs, weighted_average, DistributionBucket, PoolAggregate};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscodeWorkerRow {
    pub address: String,
    pub job_count: u64,
    pub real_time_ratio: f64,
    pub response_time: f64,
}

/// Job-weighted performance of one region plus its worker rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionPerformance {
    pub name: String,
    pub real_time_ratio: f64,
    pub response_time: f64,
    pub job_count: u64,
    pub workers: Vec<TranscodeWorkerRow>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TranscodeMetrics {
    pub total_workers: usize,
    pub total_regions: usize,
    pub total_jobs: u64,
    pub avg_real_time_ratio: String,
    pub median_real_time_ratio: String,
    pub min_real_time_ratio: String,
    pub max_real_time_ratio: String,
    pub real_time_ratio_distribution: Vec<NamedCount>,
    pub avg_compute_units_per_second: f64,
    pub median_compute_units_per_second: f64,
    pub min_compute_units_per_second: f64,
    pub max_compute_units_per_second: f64,
    /// Bucket labels are in millions of compute units per second
    pub compute_units_distribution: Vec<NamedCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopPerformer {
    pub rank: usize,
    pub region: String,
    pub address: String,
    pub speed: String,
    pub job_count: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TranscodeView {
    pub grouped_by_region: Vec<RegionPerformance>,
    pub metrics: TranscodeMetrics,
    pub top_performers: Vec<TopPerformer>,
}

pub(super) fn build(aggregate: &PoolAggregate) -> TranscodeView {
    let stats = &aggregate.stats.transcode;

    TranscodeView {
        grouped_by_region: group_by_region(aggregate),
        metrics: TranscodeMetrics {
            total_workers: stats.total_workers,
            total_regions: stats.total_regions,
            total_jobs: stats.total_jobs,
            avg_real_time_ratio: format!("{:.2}", stats.avg_real_time_ratio),
            median_real_time_ratio: format!("{:.2}", stats.median_real_time_ratio),
            min_real_time_ratio: format!("{:.2}", stats.min_real_time_ratio),
            max_real_time_ratio: format!("{:.2}", stats.max_real_time_ratio),
            real_time_ratio_distribution: labelled(&stats.real_time_ratio_distribution, 1.0),
            avg_compute_units_per_second: stats.avg_compute_units_per_second,
            median_compute_units_per_second: stats.median_compute_units_per_second,
            min_compute_units_per_second: stats.min_compute_units_per_second,
            max_compute_units_per_second: stats.max_compute_units_per_second,
            compute_units_distribution: labelled(&stats.compute_units_distribution, 1_000_000.0),
        },
        top_performers: top_performers(aggregate),
    }
}

fn labelled(buckets: &[DistributionBucket], unit: f64) -> Vec<NamedCount> {
    buckets
        .iter()
        .map(|b| NamedCount { name: (b.bucket_start / unit).to_string(), count: b.count })
        .collect()
}

fn group_by_region(aggregate: &PoolAggregate) -> Vec<RegionPerformance> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut regions: Vec<RegionPerformance> = Vec::new();

    for perf in &aggregate.transcode_performance {
        let row = TranscodeWorkerRow {
            address: shorten_address(&perf.worker_id),
            job_count: perf.job_count,
            real_time_ratio: round_to(perf.real_time_ratio_mean.unwrap_or(0.0), 2),
            response_time: round_to(perf.response_time_mean, 2),
        };
        let i = *index.entry(perf.region.as_str()).or_insert_with(|| {
            regions.push(RegionPerformance {
                name: perf.region.clone(),
                real_time_ratio: 0.0,
                response_time: 0.0,
                job_count: 0,
                workers: Vec::new(),
            });
            regions.len() - 1
        });
        regions[i].workers.push(row);
    }

    for region in &mut regions {
        region.job_count = total_jobs(region.workers.iter().map(|w| w.job_count));
        region.real_time_ratio = round_to(
            weighted_average(region.workers.iter().map(|w| (w.real_time_ratio, w.job_count))),
            2,
        );
        region.response_time = round_to(
            weighted_average(region.workers.iter().map(|w| (w.response_time, w.job_count))),
            2,
        );
    }

    regions
}

/// The speed ranking collapsed to one row per address, keeping its best
/// ratio. Region and job count come from that address's first
/// performance row.
fn top_performers(aggregate: &PoolAggregate) -> Vec<TopPerformer> {
    let mut best: Vec<(&str, f64)> = Vec::new();
    for rank in &aggregate.worker_rankings.by_transcode_performance {
        match best.iter_mut().find(|entry| entry.0 == rank.worker_id) {
            Some(entry) if rank.avg_real_time_ratio > entry.1 => entry.1 = rank.avg_real_time_ratio,
            Some(_) => {}
            None => best.push((rank.worker_id.as_str(), rank.avg_real_time_ratio)),
        }
    }
    best.sort_by(|a, b| b.1.total_cmp(&a.1));

    best.into_iter()
        .enumerate()
        .map(|(i, (address, ratio))| {
            let perf = aggregate.transcode_performance.iter().find(|p| p.worker_id == address);
            TopPerformer {
                rank: i + 1,
                region: perf.map_or_else(|| "-".to_string(), |p| p.region.clone()),
                address: shorten_address(address),
                speed: format!("{ratio:.2}"),
                job_count: format_with_commas(perf.map_or(0, |p| p.job_count)),
            }
        })
        .collect()
}
