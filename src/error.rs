//! Error taxonomy for the decoding pipeline.
//!
//! Construction-time problems (`Config`) are fatal and surface immediately.
//! Per-image stage failures are isolated: the orchestrator converts them into
//! [`ImageFailure`] summary records and keeps processing the remaining images.
//! An unmatched barcode is data ("unidentified"), never an error.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for pipeline construction and runs.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid filter, detector or codebook parameters. Rejected before any
    /// processing starts.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Incompatible shapes while concatenating spot collections into one
    /// intensity table. Fatal for that aggregation step only.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// A filter or detector stage failed on one specific image.
    #[error("stage '{stage}' failed on image {image}: {cause}")]
    Processing {
        stage: String,
        image: usize,
        cause: String,
    },

    /// A config or codebook file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A config or codebook file could not be parsed.
    #[error("failed to parse {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure of a single filter stage, reported by the stage itself without
/// knowledge of which image it was running on.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct StageError(pub String);

/// Summary record for one dropped image in a partial-success run.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageFailure {
    /// Name of the stage that failed.
    pub stage: String,
    /// Index of the image in the field-of-view sequence.
    pub image: usize,
    /// Human-readable cause.
    pub cause: String,
}

impl ImageFailure {
    pub fn to_error(&self) -> Error {
        Error::Processing {
            stage: self.stage.clone(),
            image: self.image,
            cause: self.cause.clone(),
        }
    }
}
