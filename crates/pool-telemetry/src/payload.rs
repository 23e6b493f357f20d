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

//! Wire shapes of the published metrics documents.
//!
//! Every field is optional on the wire. Missing or wrong-typed values decode
//! to zero (numbers) or `None` (strings and optional metrics) instead of
//! failing the document.

use alloy::primitives::U256;
use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use serde_json::Value;

/// `worker_summary.json`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WorkerSummaryDoc {
    #[serde(deserialize_with = "lenient::object")]
    pub data: Option<SummaryData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SummaryData {
    /// Keyed object of workers; a bare array is accepted too
    #[serde(deserialize_with = "lenient::values")]
    pub workers: Option<Vec<Value>>,
    #[serde(deserialize_with = "lenient::object")]
    pub aggregates: Option<RawAggregates>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawWorker {
    #[serde(deserialize_with = "lenient::string")]
    pub eth_address: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub region: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub node_type: Option<String>,
    #[serde(deserialize_with = "lenient::amount")]
    pub pending_fees: U256,
    #[serde(deserialize_with = "lenient::amount")]
    pub total_fees_paid: U256,
    #[serde(deserialize_with = "lenient::amount")]
    pub total_fees: U256,
    #[serde(deserialize_with = "lenient::count")]
    pub connection_count: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawAggregates {
    #[serde(deserialize_with = "lenient::count")]
    pub total_workers: u64,
    #[serde(deserialize_with = "lenient::count")]
    pub total_connections: u64,
    #[serde(deserialize_with = "lenient::amount")]
    pub total_pending_fees: U256,
    #[serde(deserialize_with = "lenient::amount")]
    pub total_fees_paid: U256,
}

/// `worker_performance.json`; which list is present depends on the node type
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WorkerPerformanceDoc {
    #[serde(deserialize_with = "lenient::values")]
    pub transcode_performance: Option<Vec<Value>>,
    #[serde(deserialize_with = "lenient::values")]
    pub ai_performance: Option<Vec<Value>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawTranscodePerformance {
    #[serde(deserialize_with = "lenient::string")]
    pub worker_address: Option<String>,
    #[serde(deserialize_with = "lenient::metric")]
    pub mean_real_time_ratio: Option<f64>,
    #[serde(deserialize_with = "lenient::metric")]
    pub mean_response_time: Option<f64>,
    #[serde(deserialize_with = "lenient::count")]
    pub job_count: u64,
    #[serde(deserialize_with = "lenient::metric")]
    pub median_compute_units_per_second: Option<f64>,
    #[serde(deserialize_with = "lenient::metric")]
    pub mean_compute_units_per_second: Option<f64>,
    #[serde(deserialize_with = "lenient::metric")]
    pub min_compute_units_per_second: Option<f64>,
    #[serde(deserialize_with = "lenient::metric")]
    pub max_compute_units_per_second: Option<f64>,
    #[serde(deserialize_with = "lenient::metric")]
    pub total_compute_units: Option<f64>,
    #[serde(deserialize_with = "lenient::amount")]
    pub total_fees: U256,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawAiPerformance {
    #[serde(deserialize_with = "lenient::string")]
    pub worker_address: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub model_id: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub pipeline: Option<String>,
    #[serde(deserialize_with = "lenient::metric")]
    pub mean_response_time: Option<f64>,
    #[serde(deserialize_with = "lenient::count")]
    pub job_count: u64,
}

/// Decode a document, falling back to its default when the top level is not
/// an object.
pub fn decode<T: DeserializeOwned + Default>(value: Value) -> T {
    serde_json::from_value(value).unwrap_or_default()
}

/// Decode each row independently; rows that are not objects are skipped.
pub fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>) -> Vec<T> {
    rows.into_iter()
        .filter_map(|row| match serde_json::from_value(row) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::debug!("Skipping malformed row: {e}");
                None
            }
        })
        .collect()
}

mod lenient {
    use std::str::FromStr;

    use super::*;

    fn to_amount(value: &Value) -> Option<U256> {
        match value {
            Value::Number(n) => n.as_u64().map(U256::from).or_else(|| {
                n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| {
                    // Finite floats beyond 2^256 saturate.
                    U256::from_str(&format!("{:.0}", f.trunc())).unwrap_or(U256::MAX)
                })
            }),
            // Large amounts are often published as decimal strings.
            Value::String(s) => U256::from_str(s.trim()).ok(),
            _ => None,
        }
    }

    pub fn amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(to_amount(&value).unwrap_or(U256::ZERO))
    }

    pub fn count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(to_amount(&value).map(|v| u64::try_from(v).unwrap_or(u64::MAX)).unwrap_or(0))
    }

    pub fn metric<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(value.as_f64().filter(|f| f.is_finite()))
    }

    pub fn string<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(value.as_str().filter(|s| !s.is_empty()).map(str::to_string))
    }

    pub fn values<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Vec<Value>>, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Array(items) => Some(items),
            Value::Object(map) => Some(map.into_iter().map(|(_, v)| v).collect()),
            _ => None,
        })
    }

    pub fn object<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let value = Value::deserialize(deserializer)?;
        if !value.is_object() {
            return Ok(None);
        }
        Ok(serde_json::from_value(value).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn summary_document_decodes() {
        let doc: WorkerSummaryDoc = decode(json!({
            "data": {
                "workers": {
                    "w1": {
                        "eth_address": "0xabc",
                        "region": "us-central",
                        "node_type": "transcode",
                        "pending_fees": 1000,
                        "total_fees_paid": "250000000000000000000",
                        "total_fees": 3.5e18,
                        "connection_count": 3
                    }
                },
                "aggregates": { "total_workers": 1, "total_connections": 3 }
            }
        }));

        let data = doc.data.unwrap();
        let workers: Vec<RawWorker> = decode_rows(data.workers.unwrap());
        assert_eq!(workers.len(), 1);
        assert_eq!(workers[0].eth_address.as_deref(), Some("0xabc"));
        assert_eq!(workers[0].pending_fees, U256::from(1000u64));
        assert_eq!(workers[0].total_fees_paid, U256::from(250_000_000_000_000_000_000u128));
        assert_eq!(workers[0].total_fees, U256::from(3_500_000_000_000_000_000u128));
        assert_eq!(workers[0].connection_count, 3);

        let aggregates = data.aggregates.unwrap();
        assert_eq!(aggregates.total_workers, 1);
        assert_eq!(aggregates.total_pending_fees, U256::ZERO);
    }

    #[test]
    fn wrong_types_fall_back_to_defaults() {
        let worker: RawWorker = decode(json!({
            "eth_address": 42,
            "pending_fees": "lots",
            "total_fees": -5,
            "connection_count": null
        }));
        assert_eq!(worker.eth_address, None);
        assert_eq!(worker.pending_fees, U256::ZERO);
        assert_eq!(worker.total_fees, U256::ZERO);
        assert_eq!(worker.connection_count, 0);

        let perf: RawTranscodePerformance = decode(json!({
            "worker_address": "0xabc",
            "mean_real_time_ratio": "fast",
            "median_compute_units_per_second": 125000000.0
        }));
        assert_eq!(perf.mean_real_time_ratio, None);
        assert_eq!(perf.median_compute_units_per_second, Some(125_000_000.0));
        assert_eq!(perf.mean_compute_units_per_second, None);
    }

    #[test]
    fn amounts_beyond_u128_decode_and_counts_saturate() {
        let worker: RawWorker = decode(json!({
            "pending_fees": 1e40,
            "total_fees_paid": "0xff",
            "total_fees": 1e300,
            "connection_count": 1e30
        }));
        assert!(worker.pending_fees > U256::from(u128::MAX));
        assert_eq!(worker.total_fees_paid, U256::from(255u64));
        assert_eq!(worker.total_fees, U256::MAX);
        assert_eq!(worker.connection_count, u64::MAX);
    }

    #[test]
    fn malformed_structure_is_empty_not_an_error() {
        let doc: WorkerSummaryDoc = decode(json!({ "data": "maintenance" }));
        assert!(doc.data.is_none());

        let doc: WorkerSummaryDoc = decode(json!(["not", "an", "object"]));
        assert!(doc.data.is_none());

        let doc: WorkerPerformanceDoc = decode(json!({ "transcode_performance": 7 }));
        assert!(doc.transcode_performance.is_none());
    }

    #[test]
    fn rows_that_are_not_objects_are_skipped() {
        let rows: Vec<RawAiPerformance> =
            decode_rows(vec![json!({ "model_id": "org/model" }), json!("garbage"), json!(3)]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].model_id.as_deref(), Some("org/model"));
    }
}
