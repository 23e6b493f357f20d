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

//! Per-region worker fee and performance telemetry.
//!
//! A run enumerates every `(region, node type, endpoint)` document, fetches
//! them all with settle-all semantics, normalizes each successful document
//! into typed records, merges them with first-write-wins deduplication and
//! aggregates the result into a [PoolSnapshot] with display-ready views.

pub mod aggregate;
pub mod config;
pub mod errors;
pub mod fetcher;
pub mod merge;
pub mod normalize;
pub mod payload;
pub mod pipeline;
pub mod records;
pub mod refresher;
pub mod sources;
pub mod targets;
pub mod ui;

pub use aggregate::PoolAggregate;
pub use config::{ConfigErr, TelemetryConfig};
pub use pipeline::{fetch_pool_details, PipelineErr, PoolSnapshot, PoolTelemetry, SourceStats};
pub use refresher::CachedSnapshot;
pub use sources::{FetchError, PoolSource};
pub use targets::{enumerate_targets, EndpointKind, FetchTarget, NodeKind};
pub use ui::{build_ui, UiViews};
