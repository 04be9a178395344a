//! Command-layer boundary.
//!
//! The pipeline never touches the log file's contents itself. It asks a
//! [`CommandLayer`] for the default path, for existence checks and for a
//! parsed snapshot, and treats every call as asynchronous and fallible.

mod local;

pub use local::LocalCommands;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from command-layer requests.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("No default log file location available: {reason}")]
    NoDefaultPath { reason: String },

    #[error("Failed to access {path}: {reason}")]
    Io { path: PathBuf, reason: String },

    #[error("Command failed: {reason}")]
    CommandFailed { reason: String },
}

/// One complete parse of the log file.
///
/// Entries are ordered newest first. A snapshot is never patched: each parse
/// produces a fresh value that replaces the previous one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSnapshot {
    pub path: PathBuf,
    pub entries: Vec<serde_json::Value>,
    /// Non-empty lines in the file, including ones beyond `entries`.
    pub total_lines: usize,
    pub parsed_at: DateTime<Utc>,
}

impl RawSnapshot {
    pub fn new(path: impl Into<PathBuf>, entries: Vec<serde_json::Value>, total_lines: usize) -> Self {
        Self {
            path: path.into(),
            entries,
            total_lines,
            parsed_at: Utc::now(),
        }
    }

    /// Most recent entry in the log, if any.
    pub fn latest(&self) -> Option<&serde_json::Value> {
        self.entries.first()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Backend commands the pipeline depends on.
#[async_trait]
pub trait CommandLayer: Send + Sync {
    /// Default log file location, used when no path is configured.
    async fn get_default_log_file_path(&self) -> Result<PathBuf, BackendError>;

    /// Whether a regular file exists at `path`.
    async fn check_log_file_exists(&self, path: &Path) -> Result<bool, BackendError>;

    /// Parse the whole file, newest entry first.
    async fn parse_log_file_reverse(&self, path: &Path) -> Result<RawSnapshot, BackendError>;
}
