//! Error types for the pipeline and its control surface.

use std::path::PathBuf;
use thiserror::Error;

/// A pipeline step that failed.
///
/// The pipeline stays in the state it had before the attempt and publishes
/// the error in `PublishedState::last_error` until it is cleared by a retry,
/// a path change, or a later success of the same step.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("Failed to resolve default log file path: {reason}")]
    Resolution { reason: String },

    #[error("Failed to check whether {path} exists: {reason}")]
    Probe { path: PathBuf, reason: String },

    #[error("Failed to watch {path}: {reason}")]
    Subscription { path: PathBuf, reason: String },

    #[error("Failed to parse {path}: {reason}")]
    Ingestion { path: PathBuf, reason: String },
}

/// Errors returned by `PipelineController`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ControlError {
    #[error("Log file path must not be empty")]
    EmptyPath,

    #[error("Failed to start pipeline: {reason}")]
    InitFailed { reason: String },

    #[error("Pipeline has shut down")]
    Closed,
}
