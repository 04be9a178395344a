//! DataIngestor: fetches a fresh snapshot and publishes it.
//!
//! Ingestions may overlap (arm-time and a change event fired right after).
//! Each request carries a sequence number taken from the state; a completion,
//! success or failure, is applied only if it is for the current path and newer
//! than the last completed one. Results are never merged into the previous
//! snapshot.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;

use super::PipelineEvent;
use super::error::PipelineError;
use super::state::PipelineState;
use crate::backend::{BackendError, CommandLayer, RawSnapshot};

impl PipelineState {
    pub(super) fn allocate_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    pub(super) fn on_ingested(
        &mut self,
        path: &Path,
        seq: u64,
        result: Result<RawSnapshot, BackendError>,
    ) {
        if self.config.path.as_deref() != Some(path) {
            crate::debug_event!("ingest", "discarded", "{} is no longer the log path", path.display());
            return;
        }
        if seq <= self.last_completed_seq {
            crate::debug_event!(
                "ingest",
                "discarded",
                "seq {seq} completed after seq {}",
                self.last_completed_seq
            );
            return;
        }
        self.last_completed_seq = seq;

        match result {
            Ok(snapshot) => {
                crate::debug_event!(
                    "ingest",
                    "snapshot",
                    "{} entries from {} (seq {seq})",
                    snapshot.len(),
                    path.display()
                );
                self.snapshot = Some(Arc::new(snapshot));
                if matches!(self.last_error, Some(PipelineError::Ingestion { .. })) {
                    self.last_error = None;
                }
            }
            Err(e) => {
                tracing::warn!("[ingest] {e}");
                self.last_error = Some(PipelineError::Ingestion {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                });
            }
        }
    }
}

/// Runs `parse_log_file_reverse` off the event loop.
#[derive(Clone)]
pub(super) struct DataIngestor {
    commands: Arc<dyn CommandLayer>,
    events: UnboundedSender<PipelineEvent>,
}

impl DataIngestor {
    pub(super) fn new(commands: Arc<dyn CommandLayer>, events: UnboundedSender<PipelineEvent>) -> Self {
        Self { commands, events }
    }

    pub(super) fn ingest(&self, path: PathBuf, seq: u64) {
        let commands = Arc::clone(&self.commands);
        let events = self.events.clone();
        crate::debug_event!("ingest", "requesting", "{} (seq {seq})", path.display());
        tokio::spawn(async move {
            let result = commands.parse_log_file_reverse(&path).await;
            let _ = events.send(PipelineEvent::Ingested { path, seq, result });
        });
    }
}
