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

use serde::Serialize;

use super::format::{format_time, format_with_commas, model_short_name, round_to, shorten_address};
use crate::aggregate::PoolAggregate;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AiPerformanceRow {
    /// Short model name
    pub name: String,
    /// Seconds
    pub response_time: f64,
    pub job_count: u64,
    pub address: String,
    pub region: String,
    pub pipeline: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AiMetrics {
    pub total_ai_workers: usize,
    pub total_models: usize,
    pub total_jobs: u64,
    pub avg_response_time: String,
}

impl Default for AiMetrics {
    fn default() -> Self {
        Self {
            total_ai_workers: 0,
            total_models: 0,
            total_jobs: 0,
            avg_response_time: format_time(0.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AiRankingRow {
    pub rank: usize,
    pub model_name: String,
    pub pipeline: String,
    pub region: String,
    pub address: String,
    pub response_time: String,
    pub job_count: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AiView {
    pub ai_performance_data: Vec<AiPerformanceRow>,
    pub metrics: AiMetrics,
    pub rankings: Vec<AiRankingRow>,
}

pub(super) fn build(aggregate: &PoolAggregate) -> AiView {
    let stats = &aggregate.stats.ai;
    let performance = &aggregate.ai_performance;

    let ai_performance_data = performance
        .iter()
        .map(|p| AiPerformanceRow {
            name: model_short_name(&p.model_id).unwrap_or("Unknown Model").to_string(),
            response_time: round_to(p.response_time_mean / 1e9, 2),
            job_count: p.job_count,
            address: shorten_address(&p.worker_id),
            region: p.region.clone(),
            pipeline: p.pipeline.clone(),
        })
        .collect();

    let rankings = aggregate
        .worker_rankings
        .by_ai_response_time
        .iter()
        .enumerate()
        .map(|(i, rank)| {
            let perf = performance
                .iter()
                .find(|p| p.worker_id == rank.worker_id && p.model_id == rank.model_id);
            AiRankingRow {
                rank: i + 1,
                model_name: model_short_name(&rank.model_id).unwrap_or("-").to_string(),
                pipeline: perf.map_or_else(|| "-".to_string(), |p| p.pipeline.clone()),
                region: perf.map_or_else(|| "-".to_string(), |p| p.region.clone()),
                address: shorten_address(&rank.worker_id),
                response_time: format_time(rank.avg_response_time),
                job_count: format_with_commas(perf.map_or(0, |p| p.job_count)),
            }
        })
        .collect();

    AiView {
        ai_performance_data,
        metrics: AiMetrics {
            total_ai_workers: stats.total_ai_workers,
            total_models: stats.total_models,
            total_jobs: stats.total_jobs,
            avg_response_time: format_time(stats.avg_response_time),
        },
        rankings,
    }
}
