// Copyright 2025 the Vistage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use thiserror::Error;

/// Errors that can occur while loading or parsing chart data.
#[derive(Error, Debug)]
pub enum DataError {
    /// A URL could not be fetched.
    #[error("failed to fetch `{url}`: {message}")]
    Fetch {
        /// The requested URL.
        url: String,
        /// Transport-level message.
        message: String,
    },

    /// A local file could not be read.
    #[error("failed to read `{path}`: {source}")]
    Io {
        /// The resolved path.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// JSON parse error.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Delimited-text parse error.
    #[error("CSV parse error on line {line}: {message}")]
    Csv {
        /// 1-based line number.
        line: usize,
        /// What went wrong.
        message: String,
    },

    /// The input contained no data at all.
    #[error("empty input")]
    EmptyInput,

    /// The value cannot be interpreted as chart data.
    #[error("unsupported data value: {0}")]
    UnsupportedValue(String),

    /// The after-loaded hook rejected the data.
    #[error("after-loaded hook failed: {0}")]
    Hook(String),
}
