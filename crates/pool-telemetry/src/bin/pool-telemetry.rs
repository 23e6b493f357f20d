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

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pool_telemetry::{
    config::{parse_endpoints, parse_region_node_map},
    fetch_pool_details, CachedSnapshot, PoolTelemetry, TelemetryConfig,
};
use tokio_util::sync::CancellationToken;

/// Arguments of the telemetry CLI.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct MainArgs {
    /// Path to a TOML config file.
    #[clap(short, long, env = "POOL_CONFIG")]
    config: Option<PathBuf>,
    /// Root URL of the metrics documents; `file://` reads from a local directory.
    #[clap(long, env = "POOL_BASE_URL")]
    base_url: Option<String>,
    /// Comma separated endpoint names.
    #[clap(long, env = "POOL_ENDPOINTS")]
    endpoints: Option<String>,
    /// JSON object of region name to node type list.
    #[clap(long, env = "POOL_REGION_NODE_MAP")]
    region_node_map: Option<String>,
    /// Maximum number of in-flight requests per run.
    #[clap(long, env = "POOL_MAX_CONCURRENT_FETCHES")]
    max_concurrent_fetches: Option<usize>,
    /// Interval in seconds between refreshes in watch mode.
    #[clap(long, env = "POOL_REFRESH_INTERVAL")]
    refresh_interval: Option<u64>,
    /// Whether to log in JSON format.
    #[clap(long, env, default_value_t = false)]
    log_json: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the pipeline once and print the snapshot as JSON.
    Snapshot {
        /// Pretty print the JSON output.
        #[clap(long, default_value_t = false)]
        pretty: bool,
    },
    /// Refresh the snapshot periodically until interrupted.
    Watch,
}

async fn build_config(args: &MainArgs) -> Result<TelemetryConfig> {
    let mut config = match &args.config {
        Some(path) => TelemetryConfig::load(path).await?,
        None => TelemetryConfig::default(),
    };

    if let Some(base_url) = &args.base_url {
        config.base_url = base_url.clone();
    }
    if let Some(endpoints) = &args.endpoints {
        config.endpoints = parse_endpoints(endpoints);
    }
    if let Some(raw) = &args.region_node_map {
        config.region_node_map = parse_region_node_map(raw).unwrap_or_else(|err| {
            tracing::error!("Ignoring region node map: {err:?}");
            Default::default()
        });
    }
    if args.max_concurrent_fetches.is_some() {
        config.max_concurrent_fetches = args.max_concurrent_fetches;
    }
    if let Some(secs) = args.refresh_interval {
        config.refresh_interval_secs = secs;
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = MainArgs::parse();

    if args.log_json {
        tracing_subscriber::fmt()
            .with_ansi(false)
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .init();
    }

    let config = build_config(&args).await?;

    match args.command {
        Command::Snapshot { pretty } => {
            let snapshot = fetch_pool_details(&config).await;
            let json = if pretty {
                serde_json::to_string_pretty(&snapshot)
            } else {
                serde_json::to_string(&snapshot)
            }
            .context("Failed to serialize snapshot")?;
            println!("{json}");
        }
        Command::Watch => {
            let telemetry = PoolTelemetry::from_config(config)
                .map_err(|err| anyhow::anyhow!("Cannot start telemetry refresh: {err:?}"))?;
            let cached = Arc::new(CachedSnapshot::new(telemetry));

            let cancel_token = CancellationToken::new();
            let handle = cached.spawn_refresh_task(cancel_token.clone());

            tokio::signal::ctrl_c().await.context("Failed to listen for ctrl-c")?;
            tracing::info!("Received ctrl-c, stopping");
            cancel_token.cancel();
            handle.await.context("Refresh task panicked")?;
        }
    }

    Ok(())
}
