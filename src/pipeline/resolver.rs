//! PathResolver: asks the command layer for a default path when none is set.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;

use super::error::PipelineError;
use super::state::PipelineState;
use super::{Effect, PipelineEvent};
use crate::backend::{BackendError, CommandLayer};

impl PipelineState {
    /// One resolution per unset-path condition; a failure waits for `retry`.
    pub(super) fn next_resolution(&mut self) -> Option<Effect> {
        if self.config.path.is_some() || self.resolving || self.resolve_failed {
            return None;
        }
        self.resolving = true;
        Some(Effect::ResolvePath)
    }

    pub(super) fn on_resolved(&mut self, result: Result<PathBuf, BackendError>) {
        self.resolving = false;

        if let Some(current) = &self.config.path {
            crate::debug_event!(
                "resolver",
                "discarded",
                "path already set to {}",
                current.display()
            );
            return;
        }

        let reason = match result {
            Ok(path) if !path.as_os_str().is_empty() => {
                crate::log_event!("resolver", "default path", "{}", path.display());
                self.change_path(path);
                return;
            }
            Ok(_) => "command layer returned an empty path".to_string(),
            Err(e) => e.to_string(),
        };

        tracing::warn!("[resolver] {reason}");
        self.resolve_failed = true;
        self.last_error = Some(PipelineError::Resolution { reason });
    }
}

/// Runs `get_default_log_file_path` off the event loop.
#[derive(Clone)]
pub(super) struct PathResolver {
    commands: Arc<dyn CommandLayer>,
    events: UnboundedSender<PipelineEvent>,
}

impl PathResolver {
    pub(super) fn new(commands: Arc<dyn CommandLayer>, events: UnboundedSender<PipelineEvent>) -> Self {
        Self { commands, events }
    }

    pub(super) fn resolve(&self) {
        let commands = Arc::clone(&self.commands);
        let events = self.events.clone();
        crate::debug_event!("resolver", "requesting default path");
        tokio::spawn(async move {
            let result = commands.get_default_log_file_path().await;
            let _ = events.send(PipelineEvent::Resolved(result));
        });
    }
}
