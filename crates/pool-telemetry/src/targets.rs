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

//! The fetch grid: every (region × node type × endpoint) combination the
//! pipeline requests on a run.

use std::fmt;

use crate::config::TelemetryConfig;

/// Endpoint names understood by the normalizer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EndpointKind {
    /// Per-worker fees and connection counts plus source aggregates
    WorkerSummary,
    /// Per-worker transcode or AI performance rows
    WorkerPerformance,
    /// Any other configured endpoint; fetched but ignored downstream
    Other(String),
}

impl EndpointKind {
    pub fn from_name(name: &str) -> Self {
        match name {
            "worker_summary" => Self::WorkerSummary,
            "worker_performance" => Self::WorkerPerformance,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::WorkerSummary => "worker_summary",
            Self::WorkerPerformance => "worker_performance",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for EndpointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Node type partition of the worker pool.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Transcode,
    Ai,
    Other(String),
}

impl NodeKind {
    pub fn from_name(name: &str) -> Self {
        match name {
            "transcode" => Self::Transcode,
            "ai" => Self::Ai,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Transcode => "transcode",
            Self::Ai => "ai",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One document to fetch on a run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchTarget {
    pub region: String,
    pub node_type: NodeKind,
    pub endpoint: EndpointKind,
}

impl FetchTarget {
    pub fn new(region: &str, node_type: &str, endpoint: &str) -> Self {
        Self {
            region: region.to_string(),
            node_type: NodeKind::from_name(node_type),
            endpoint: EndpointKind::from_name(endpoint),
        }
    }

    /// `{base}/{region}/{node_type}/{endpoint}.json`
    pub fn url(&self, base_url: &str) -> String {
        format!(
            "{}/{}/{}/{}.json",
            base_url.trim_end_matches('/'),
            self.region,
            self.node_type,
            self.endpoint
        )
    }
}

impl fmt::Display for FetchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.region, self.node_type, self.endpoint)
    }
}

/// Build the full grid of targets, regions outermost and endpoints innermost,
/// each level in configured order.
///
/// An empty region map or endpoint list yields an empty grid, which callers
/// treat as "no data available".
pub fn enumerate_targets(config: &TelemetryConfig) -> Vec<FetchTarget> {
    let regions = config.regions();
    if regions.is_empty() || config.endpoints.is_empty() {
        return Vec::new();
    }

    let mut targets = Vec::new();
    for region in regions {
        for node_type in config.node_types_for_region(region) {
            for endpoint in &config.endpoints {
                targets.push(FetchTarget::new(region, node_type, endpoint));
            }
        }
    }
    targets
}
