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

use super::format::{format_eth, shorten_address};
use crate::aggregate::PoolAggregate;
use crate::records::{serialize_wei, WorkerIdentity};

/// A worker identity with its fees and connections side by side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkerRow {
    pub eth_address: String,
    pub node_type: String,
    pub region: String,
    #[serde(serialize_with = "serialize_wei")]
    pub pending_fees: U256,
    #[serde(serialize_with = "serialize_wei")]
    pub paid_fees: U256,
    #[serde(serialize_with = "serialize_wei")]
    pub total_fees: U256,
    pub connection_count: u64,
    pub pending_fees_formatted: String,
    pub paid_fees_formatted: String,
    pub total_fees_formatted: String,
    pub shortened_address: String,
}

impl WorkerRow {
    fn new(identity: WorkerIdentity, pending: U256, paid: U256, total: U256) -> Self {
        Self {
            shortened_address: shorten_address(&identity.worker_id),
            eth_address: identity.worker_id,
            node_type: identity.node_type,
            region: identity.region,
            pending_fees: pending,
            paid_fees: paid,
            total_fees: total,
            connection_count: 0,
            pending_fees_formatted: format_eth(pending),
            paid_fees_formatted: format_eth(paid),
            total_fees_formatted: format_eth(total),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WorkersView {
    pub workers_by_fees: Vec<WorkerRow>,
    pub workers_by_connections: Vec<WorkerRow>,
}

pub(super) fn build(aggregate: &PoolAggregate) -> WorkersView {
    let mut index: HashMap<WorkerIdentity, usize> = HashMap::new();
    let mut rows: Vec<WorkerRow> = Vec::new();

    for fee in &aggregate.worker_fees {
        index.insert(fee.identity(), rows.len());
        rows.push(WorkerRow::new(fee.identity(), fee.pending_fees, fee.paid_fees, fee.total_fees));
    }

    for connection in &aggregate.worker_connections {
        let identity = connection.identity();
        match index.get(&identity) {
            Some(&i) => rows[i].connection_count = connection.connection_count,
            None => {
                let mut row = WorkerRow::new(identity, U256::ZERO, U256::ZERO, U256::ZERO);
                row.connection_count = connection.connection_count;
                rows.push(row);
            }
        }
    }

    let mut workers_by_fees = rows.clone();
    workers_by_fees.sort_by(|a, b| b.total_fees.cmp(&a.total_fees));
    let mut workers_by_connections = rows;
    workers_by_connections.sort_by(|a, b| b.connection_count.cmp(&a.connection_count));

    WorkersView { workers_by_fees, workers_by_connections }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::fixtures::{sample_aggregate, ADDR_A, ADDR_B, ADDR_C};

    fn keys(rows: &[WorkerRow]) -> Vec<(&str, &str)> {
        rows.iter().map(|r| (r.eth_address.as_str(), r.region.as_str())).collect()
    }

    #[test]
    fn joins_fees_and_connections_on_identity() {
        let view = build(&sample_aggregate());
        assert_eq!(view.workers_by_fees.len(), 4);

        let a_us = &view.workers_by_fees[0];
        assert_eq!(a_us.eth_address, ADDR_A);
        assert_eq!(a_us.connection_count, 3);
        assert_eq!(a_us.total_fees_formatted, "2.500000");

        // Connection-only identity gets zero fees
        let a_eu = view
            .workers_by_fees
            .iter()
            .find(|r| r.eth_address == ADDR_A && r.region == "eu-central")
            .unwrap();
        assert_eq!(a_eu.total_fees, U256::ZERO);
        assert_eq!(a_eu.pending_fees_formatted, "0.000000");
        assert_eq!(a_eu.connection_count, 5);
    }

    #[test]
    fn sorts_are_descending_and_stable() {
        let view = build(&sample_aggregate());
        assert_eq!(
            keys(&view.workers_by_fees),
            vec![
                (ADDR_A, "us-central"),
                (ADDR_B, "us-central"),
                (ADDR_C, "eu-central"),
                (ADDR_A, "eu-central"),
            ]
        );
        assert_eq!(
            keys(&view.workers_by_connections),
            vec![
                (ADDR_A, "eu-central"),
                (ADDR_A, "us-central"),
                (ADDR_C, "eu-central"),
                (ADDR_B, "us-central"),
            ]
        );
    }
}
