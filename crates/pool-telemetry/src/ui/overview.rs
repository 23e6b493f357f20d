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

use alloy::primitives::U256;
use serde::Serialize;

use super::format::{format_eth, shorten_address, wei_to_eth_rounded};
use super::{count_by, NamedCount};
use crate::aggregate::PoolAggregate;
use crate::records::serialize_wei;

/// Per-region fee totals in ETH, rounded to four decimals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionFees {
    pub name: String,
    pub pending: f64,
    pub paid: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OverviewSummary {
    pub total_workers: u64,
    pub total_active_connections: u64,
    pub total_pending_fees_formatted: String,
    pub total_paid_fees_formatted: String,
    pub average_pending_per_worker_formatted: String,
    pub average_paid_per_worker_formatted: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopWorkerByFees {
    pub eth_address: String,
    #[serde(serialize_with = "serialize_wei")]
    pub total_fees: U256,
    pub formatted_total_fees: String,
    pub shortened_address: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OverviewView {
    /// Connection records per region
    pub region_data: Vec<NamedCount>,
    /// Connection records per node type
    pub node_type_data: Vec<NamedCount>,
    pub region_fees_chart_data: Vec<RegionFees>,
    pub summary: OverviewSummary,
    pub top_workers_by_fees: Vec<TopWorkerByFees>,
}

pub(super) fn build(aggregate: &PoolAggregate) -> OverviewView {
    let connections = &aggregate.worker_connections;
    let summary = &aggregate.summary;

    OverviewView {
        region_data: count_by(connections.iter().map(|c| c.region.as_str())),
        node_type_data: count_by(connections.iter().map(|c| c.node_type.as_str())),
        region_fees_chart_data: region_fees(aggregate),
        summary: OverviewSummary {
            total_workers: summary.total_workers,
            total_active_connections: summary.total_active_connections,
            total_pending_fees_formatted: format_eth(summary.total_pending_fees),
            total_paid_fees_formatted: format_eth(summary.total_paid_fees),
            average_pending_per_worker_formatted: format_eth(summary.average_pending_per_worker),
            average_paid_per_worker_formatted: format_eth(summary.average_paid_per_worker),
        },
        top_workers_by_fees: aggregate
            .worker_rankings
            .by_fees
            .iter()
            .map(|rank| TopWorkerByFees {
                eth_address: rank.worker_id.clone(),
                total_fees: rank.total_fees,
                formatted_total_fees: format_eth(rank.total_fees),
                shortened_address: shorten_address(&rank.worker_id),
            })
            .collect(),
    }
}

fn region_fees(aggregate: &PoolAggregate) -> Vec<RegionFees> {
    // (pending, paid, total) in wei, regions in first-seen order
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut sums: Vec<(&str, U256, U256, U256)> = Vec::new();

    for record in &aggregate.worker_fees {
        let i = *index.entry(record.region.as_str()).or_insert_with(|| {
            sums.push((record.region.as_str(), U256::ZERO, U256::ZERO, U256::ZERO));
            sums.len() - 1
        });
        let entry = &mut sums[i];
        entry.1 = entry.1.saturating_add(record.pending_fees);
        entry.2 = entry.2.saturating_add(record.paid_fees);
        entry.3 = entry.3.saturating_add(record.total_fees);
    }

    sums.into_iter()
        .map(|(name, pending, paid, total)| RegionFees {
            name: name.to_string(),
            pending: wei_to_eth_rounded(pending),
            paid: wei_to_eth_rounded(paid),
            total: wei_to_eth_rounded(total),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::fixtures::{sample_aggregate, ADDR_A};

    #[test]
    fn groups_connections_by_region_and_node_type() {
        let view = build(&sample_aggregate());
        assert_eq!(
            view.region_data,
            vec![
                NamedCount { name: "us-central".into(), count: 2 },
                NamedCount { name: "eu-central".into(), count: 2 },
            ]
        );
        assert_eq!(
            view.node_type_data,
            vec![
                NamedCount { name: "transcode".into(), count: 3 },
                NamedCount { name: "ai".into(), count: 1 },
            ]
        );
    }

    #[test]
    fn region_fees_are_in_eth() {
        let view = build(&sample_aggregate());
        assert_eq!(
            view.region_fees_chart_data,
            vec![
                RegionFees { name: "us-central".into(), pending: 0.5, paid: 3.0, total: 3.5 },
                RegionFees { name: "eu-central".into(), pending: 1.0, paid: 0.0, total: 1.0 },
            ]
        );
    }

    #[test]
    fn summary_is_formatted() {
        let view = build(&sample_aggregate());
        assert_eq!(view.summary.total_workers, 3);
        assert_eq!(view.summary.total_active_connections, 6);
        assert_eq!(view.summary.total_pending_fees_formatted, "1.500000");
        assert_eq!(view.summary.total_paid_fees_formatted, "3.000000");
        assert_eq!(view.summary.average_pending_per_worker_formatted, "0.500000");
        assert_eq!(view.summary.average_paid_per_worker_formatted, "1.000000");
    }

    #[test]
    fn region_fee_sums_saturate() {
        let mut aggregate = sample_aggregate();
        for record in &mut aggregate.worker_fees {
            record.total_fees = U256::MAX;
        }
        let chart = region_fees(&aggregate);
        assert_eq!(chart.len(), 2);
        assert!(chart.iter().all(|region| region.total > 1e58));
    }

    #[test]
    fn top_workers_follow_fee_ranking() {
        let view = build(&sample_aggregate());
        let top = &view.top_workers_by_fees[0];
        assert_eq!(top.eth_address, ADDR_A);
        assert_eq!(top.formatted_total_fees, "2.500000");
        assert_eq!(top.shortened_address, "0xaaaa...aaaa");
        assert_eq!(view.top_workers_by_fees.len(), 3);
    }
}
