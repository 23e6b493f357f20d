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

//! Display formatting shared by the views.

use alloy::primitives::{utils::format_units, U256};

use crate::records::UNKNOWN;

/// Wei in one micro-ETH, the last displayed digit.
const WEI_PER_MICRO_ETH: u64 = 1_000_000_000_000;

/// Format a wei amount as ETH with exactly six decimals, rounding half up.
pub fn format_eth(wei: U256) -> String {
    let step = U256::from(WEI_PER_MICRO_ETH);
    let micro = wei.saturating_add(step / U256::from(2u64)) / step;
    format_units(micro, 6u8).unwrap_or_else(|_| "0.000000".to_string())
}

/// Wei to ETH, rounded to four decimals for chart values.
pub fn wei_to_eth_rounded(wei: U256) -> f64 {
    let eth = format_units(wei, "ether").ok().and_then(|eth| eth.parse::<f64>().ok());
    round_to(eth.unwrap_or(0.0), 4)
}

/// Scale a nanosecond duration to the largest of μs, ms or s that keeps it
/// below 1000 units of the next, with two decimals.
pub fn format_time(nanos: f64) -> String {
    if nanos < 1_000_000.0 {
        format!("{:.2} μs", nanos / 1_000.0)
    } else if nanos < 1_000_000_000.0 {
        format!("{:.2} ms", nanos / 1_000_000.0)
    } else {
        format!("{:.2} s", nanos / 1_000_000_000.0)
    }
}

/// `0x1234...abcd` form of a wallet address.
pub fn shorten_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 10 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

/// Format a u64 number with comma separators
pub fn format_with_commas(num: u64) -> String {
    let s = num.to_string();
    let mut result = String::new();
    let mut count = 0;

    for ch in s.chars().rev() {
        if count == 3 {
            result.insert(0, ',');
            count = 0;
        }
        result.insert(0, ch);
        count += 1;
    }

    result
}

/// Short display name of a model id (`org/model` → `model`).
///
/// Returns `None` for the missing-model sentinel so callers pick their own
/// placeholder.
pub fn model_short_name(model_id: &str) -> Option<&str> {
    if model_id.is_empty() || model_id == UNKNOWN {
        return None;
    }
    Some(match model_id.split_once('/') {
        Some((_, rest)) => rest.split('/').next().unwrap_or(rest),
        None => model_id,
    })
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    let rounded = (value * factor).round() / factor;
    if rounded.is_finite() {
        rounded
    } else {
        0.0
    }
}
