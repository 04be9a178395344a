//! ExistenceProbe: confirms the file exists before anything is watched.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;

use super::error::PipelineError;
use super::state::PipelineState;
use super::{Effect, PipelineEvent};
use crate::backend::{BackendError, CommandLayer};

impl PipelineState {
    pub(super) fn next_probe(&mut self) -> Option<Effect> {
        let path = self.config.path.as_ref()?;
        if self.config.checked || self.probe_failed || self.probing == Some(self.path_epoch) {
            return None;
        }
        self.probing = Some(self.path_epoch);
        Some(Effect::Probe {
            path: path.clone(),
            epoch: self.path_epoch,
        })
    }

    pub(super) fn on_probed(&mut self, epoch: u64, result: Result<bool, BackendError>) {
        if self.probing == Some(epoch) {
            self.probing = None;
        }
        if epoch != self.path_epoch {
            crate::debug_event!("probe", "discarded", "result for superseded path (epoch {epoch})");
            return;
        }
        let Some(path) = self.config.path.clone() else {
            return;
        };

        match result {
            Ok(exists) => {
                if exists {
                    crate::log_event!("probe", "found", "{}", path.display());
                } else {
                    crate::log_event!("probe", "missing", "{}", path.display());
                }
                self.config.record_probe(exists);
            }
            Err(e) => {
                tracing::warn!("[probe] {e}");
                self.probe_failed = true;
                self.last_error = Some(PipelineError::Probe {
                    path,
                    reason: e.to_string(),
                });
            }
        }
    }
}

/// Runs `check_log_file_exists` off the event loop.
#[derive(Clone)]
pub(super) struct ExistenceProbe {
    commands: Arc<dyn CommandLayer>,
    events: UnboundedSender<PipelineEvent>,
}

impl ExistenceProbe {
    pub(super) fn new(commands: Arc<dyn CommandLayer>, events: UnboundedSender<PipelineEvent>) -> Self {
        Self { commands, events }
    }

    pub(super) fn check(&self, path: PathBuf, epoch: u64) {
        let commands = Arc::clone(&self.commands);
        let events = self.events.clone();
        crate::debug_event!("probe", "checking", "{}", path.display());
        tokio::spawn(async move {
            let result = commands.check_log_file_exists(&path).await;
            let _ = events.send(PipelineEvent::Probed { epoch, result });
        });
    }
}
