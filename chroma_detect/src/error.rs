// THEORY:
// The detection core itself never fails: degenerate histograms, zero-area
// components and out-of-range neighbours are all handled as data. Errors only
// exist at the edges of the engine, where caller-supplied buffers, config files
// and the worker pool of the parallel pipeline come in.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used by every fallible `chroma_detect` entry point.
pub type Result<T> = std::result::Result<T, DetectionError>;

#[derive(Error, Debug)]
pub enum DetectionError {
    /// A pixel buffer or image does not have the working resolution.
    #[error("frame size mismatch: expected {expected}, got {actual}")]
    FrameSize { expected: String, actual: String },

    /// A configuration value the pipeline cannot run with.
    #[error("invalid parameter: {parameter} = {value}")]
    InvalidParameter { parameter: String, value: String },

    /// A JSON configuration file could not be read or parsed.
    #[error("failed to load config from {path:?}")]
    ConfigLoad {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The parallel pipeline could not hand a task to, or hear back from, a worker.
    #[error("worker pool failure: {0}")]
    WorkerPool(&'static str),
}

impl DetectionError {
    pub(crate) fn frame_size(expected: impl ToString, actual: impl ToString) -> Self {
        Self::FrameSize {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    pub(crate) fn invalid_parameter(parameter: &str, value: impl ToString) -> Self {
        Self::InvalidParameter {
            parameter: parameter.to_string(),
            value: value.to_string(),
        }
    }

    pub(crate) fn config_load<E>(path: impl Into<PathBuf>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ConfigLoad {
            path: path.into(),
            source: Box::new(source),
        }
    }
}
