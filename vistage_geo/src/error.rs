// Copyright 2025 the Vistage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use thiserror::Error;
use vistage_data::DataError;

/// Errors that can occur while loading or decoding map geometry.
#[derive(Error, Debug)]
pub enum GeoError {
    /// The topology is not valid TopoJSON.
    #[error("TopoJSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The requested object is not part of the topology.
    #[error("topology has no object named `{0}`")]
    MissingObject(String),

    /// A geometry references an arc that does not exist.
    #[error("arc index {0} is out of range")]
    ArcIndex(i64),

    /// The topology could not be fetched.
    #[error(transparent)]
    Data(#[from] DataError),
}
