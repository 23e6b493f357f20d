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

use thiserror::Error;

use crate::{errors::CodedError, impl_coded_debug};

/// Soft failures for a single fetch target. None of these abort a run.
#[derive(Error)]
pub enum FetchError {
    /// Transport level failure (connect, timeout, TLS, ...)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response
    #[error("Failed to fetch data from {url}: status {status}")]
    Status {
        /// Requested URL
        url: String,
        /// HTTP status code returned
        status: u16,
    },

    /// The body was not a JSON document
    #[error("Failed to decode {url}: {message}")]
    Decode {
        /// Requested URL or path
        url: String,
        /// Decoder error message
        message: String,
    },

    /// Local read failure for file backed sources
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Path that was read
        path: String,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The source could not be built from the configured location
    #[error("Invalid source location: {0}")]
    InvalidLocation(String),
}

impl_coded_debug!(FetchError);

impl CodedError for FetchError {
    fn code(&self) -> &str {
        match self {
            FetchError::Http(_) => "[P-FET-1001]",
            FetchError::Status { .. } => "[P-FET-1002]",
            FetchError::Decode { .. } => "[P-FET-1003]",
            FetchError::Io { .. } => "[P-FET-1004]",
            FetchError::InvalidLocation(_) => "[P-FET-1005]",
        }
    }
}
