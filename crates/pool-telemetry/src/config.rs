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

//! Static configuration for the telemetry pipeline.
//!
//! The configuration is read once at startup, from a TOML file and/or
//! CLI flags and environment variables, and is never consulted on the hot path
//! except to derive the fetch grid.

use std::{path::Path, time::Duration};

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs;

use crate::{errors::CodedError, impl_coded_debug};

pub mod defaults {
    pub const fn request_timeout_secs() -> u64 {
        30
    }

    pub const fn refresh_interval_secs() -> u64 {
        // The dashboard refreshes hourly.
        3600
    }

    /// Shortest refresh interval `watch` will run with
    pub const fn min_refresh_interval_secs() -> u64 {
        1
    }

    pub fn endpoints() -> Vec<String> {
        vec!["worker_summary".to_string(), "worker_performance".to_string()]
    }
}

#[derive(Error)]
pub enum ConfigErr {
    #[error("Missing base_url configuration")]
    MissingBaseUrl,

    #[error("No regions found in region_node_map configuration")]
    NoRegions,

    #[error("No node types found in region_node_map configuration")]
    NoNodeTypes,

    #[error("Missing or empty endpoints configuration")]
    NoEndpoints,

    #[error("Invalid region_node_map: {0}")]
    InvalidRegionMap(String),
}

impl_coded_debug!(ConfigErr);

impl CodedError for ConfigErr {
    fn code(&self) -> &str {
        match self {
            ConfigErr::MissingBaseUrl => "[P-CON-2001]",
            ConfigErr::NoRegions => "[P-CON-2002]",
            ConfigErr::NoNodeTypes => "[P-CON-2003]",
            ConfigErr::NoEndpoints => "[P-CON-2004]",
            ConfigErr::InvalidRegionMap(_) => "[P-CON-2005]",
        }
    }
}

/// Top level config for the telemetry pipeline
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Root URL under which `{region}/{node_type}/{endpoint}.json` documents are served
    pub base_url: String,
    /// Ordered list of endpoint names fetched for every region / node type pair
    pub endpoints: Vec<String>,
    /// Region name to the node types that are valid in that region, in the
    /// order the fetch grid visits them
    pub region_node_map: IndexMap<String, Vec<String>>,
    /// Per request timeout in seconds
    pub request_timeout_secs: u64,
    /// Optional cap on in-flight requests; unbounded fan-out when unset
    pub max_concurrent_fetches: Option<usize>,
    /// Interval between refreshes in `watch` mode
    pub refresh_interval_secs: u64,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            endpoints: defaults::endpoints(),
            region_node_map: IndexMap::new(),
            request_timeout_secs: defaults::request_timeout_secs(),
            max_concurrent_fetches: None,
            refresh_interval_secs: defaults::refresh_interval_secs(),
        }
    }
}

impl TelemetryConfig {
    /// Load the config from disk
    pub async fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .await
            .context(format!("Failed to read config file from {path:?}"))?;
        toml::from_str(&data).context(format!("Failed to parse toml file from {path:?}"))
    }

    /// Regions in the order the fetch grid visits them
    pub fn regions(&self) -> Vec<&str> {
        self.region_node_map.keys().map(String::as_str).collect()
    }

    /// Distinct node types across every region, in first-seen order
    pub fn node_types(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for node_type in self.region_node_map.values().flatten() {
            if !seen.contains(&node_type.as_str()) {
                seen.push(node_type.as_str());
            }
        }
        seen
    }

    /// Node types configured for `region`, empty when the region is unknown
    pub fn node_types_for_region(&self, region: &str) -> &[String] {
        self.region_node_map.get(region).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Refresh period, never shorter than [defaults::min_refresh_interval_secs]
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(defaults::min_refresh_interval_secs()))
    }

    /// Check that every setting required to build the fetch grid is present.
    pub fn validate(&self) -> Result<(), ConfigErr> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigErr::MissingBaseUrl);
        }
        if self.region_node_map.is_empty() {
            return Err(ConfigErr::NoRegions);
        }
        if self.node_types().is_empty() {
            return Err(ConfigErr::NoNodeTypes);
        }
        if self.endpoints.is_empty() {
            return Err(ConfigErr::NoEndpoints);
        }
        Ok(())
    }
}

/// Split a comma separated endpoint list, dropping blank entries.
pub fn parse_endpoints(raw: &str) -> Vec<String> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect()
}

/// Parse a JSON object of region to node type list.
/// Regions keep the order they are written in.
pub fn parse_region_node_map(raw: &str) -> Result<IndexMap<String, Vec<String>>, ConfigErr> {
    if raw.trim().is_empty() {
        return Ok(IndexMap::new());
    }
    serde_json::from_str(raw).map_err(|e| ConfigErr::InvalidRegionMap(e.to_string()))
}
