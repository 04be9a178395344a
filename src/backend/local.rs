//! Filesystem-backed command layer.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{Value, json};

use super::{BackendError, CommandLayer, RawSnapshot};
use crate::config::Settings;

/// Reads the log file straight from disk.
///
/// Each non-empty line becomes one entry. Lines holding a JSON object are
/// kept as-is; anything else is wrapped as `{"raw": "<line>"}`.
#[derive(Debug, Clone)]
pub struct LocalCommands {
    /// Configured default path; takes priority over the platform location.
    default_path: Option<PathBuf>,
    /// Maximum entries kept per snapshot.
    max_entries: usize,
}

impl LocalCommands {
    pub fn new(default_path: Option<PathBuf>, max_entries: usize) -> Self {
        Self {
            default_path,
            max_entries,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.log_file.clone(), settings.parser.max_entries)
    }
}

/// `<data_local_dir>/gamelog/game.log`
fn platform_log_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join("gamelog").join("game.log"))
}

#[async_trait]
impl CommandLayer for LocalCommands {
    async fn get_default_log_file_path(&self) -> Result<PathBuf, BackendError> {
        if let Some(path) = &self.default_path {
            return Ok(path.clone());
        }
        platform_log_path().ok_or_else(|| BackendError::NoDefaultPath {
            reason: "no local data directory on this platform; set `log_file`".to_string(),
        })
    }

    async fn check_log_file_exists(&self, path: &Path) -> Result<bool, BackendError> {
        match tokio::fs::metadata(path).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(BackendError::Io {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }),
        }
    }

    async fn parse_log_file_reverse(&self, path: &Path) -> Result<RawSnapshot, BackendError> {
        let bytes = tokio::fs::read(path).await.map_err(|e| BackendError::Io {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let content = String::from_utf8_lossy(&bytes);
        Ok(parse_reverse(path, &content, self.max_entries))
    }
}

/// Build a snapshot from file contents, newest line first.
pub(crate) fn parse_reverse(path: &Path, content: &str, max_entries: usize) -> RawSnapshot {
    let lines: Vec<&str> = content
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .collect();

    let entries = lines
        .iter()
        .rev()
        .take(max_entries)
        .map(|line| parse_line(line))
        .collect();

    RawSnapshot::new(path, entries, lines.len())
}

fn parse_line(line: &str) -> Value {
    match serde_json::from_str::<Value>(line) {
        Ok(value @ Value::Object(_)) => value,
        _ => json!({ "raw": line }),
    }
}
