//! WatchSupervisor: owns the single live watch subscription.
//!
//! The event loop decides *when* to arm or disarm (see the transitions
//! below) and hands the supervisor task a command. The task processes
//! commands strictly in order and always awaits the release of the current
//! handle before it creates the next one, so there is never more than one
//! live subscription.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use super::error::PipelineError;
use super::ingestor::DataIngestor;
use super::state::{ArmKey, ArmState, DebounceWindow, PipelineState};
use super::{Effect, PipelineEvent};
use crate::watcher::{ChangeCallback, WatchError, WatchHandle, WatchOptions, WatchPrimitive};

impl PipelineState {
    /// Arm when the file is known to exist, re-arm when path or window
    /// changed, disarm otherwise.
    pub(super) fn next_arm(&mut self) -> Option<Effect> {
        let desired = self.config.armable_path().map(|path| ArmKey {
            path: path.to_path_buf(),
            debounce: self.config.debounce,
        });
        if desired == self.armed {
            return None;
        }
        let Some(key) = desired else {
            return self.disarm();
        };

        // Bumping the generation first detaches notifications of the old handle
        self.generation += 1;
        let ingest_seq = self.allocate_seq();
        self.arm_state = ArmState::Pending;
        self.armed = Some(key.clone());
        Some(Effect::Arm {
            path: key.path,
            debounce: key.debounce,
            generation: self.generation,
            ingest_seq,
        })
    }

    pub(super) fn disarm(&mut self) -> Option<Effect> {
        self.armed.take()?;
        self.generation += 1;
        self.arm_state = ArmState::Idle;
        Some(Effect::Disarm {
            generation: self.generation,
        })
    }

    pub(super) fn on_armed(&mut self, generation: u64, result: Result<(), WatchError>) {
        if generation != self.generation {
            crate::debug_event!("supervisor", "stale arm result", "generation {generation}");
            return;
        }
        let Some(key) = &self.armed else {
            return;
        };

        match result {
            Ok(()) => {
                crate::log_event!(
                    "supervisor",
                    "watching",
                    "{} (debounce {})",
                    key.path.display(),
                    key.debounce
                );
                self.arm_state = ArmState::Live;
            }
            Err(e) => {
                tracing::error!("[supervisor] {e}");
                self.arm_state = ArmState::Failed;
                self.last_error = Some(PipelineError::Subscription {
                    path: key.path.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    /// A change notification turns into one ingestion, unless it came from
    /// a handle that has since been released.
    pub(super) fn on_changed(&mut self, generation: u64) -> Option<Effect> {
        let live = matches!(self.arm_state, ArmState::Pending | ArmState::Live);
        if generation != self.generation || !live {
            crate::debug_event!("supervisor", "ignored change", "generation {generation}");
            return None;
        }
        let path = self.armed.as_ref()?.path.clone();
        Some(Effect::Ingest {
            path,
            seq: self.allocate_seq(),
        })
    }
}

pub(super) enum SupervisorCommand {
    Arm {
        path: PathBuf,
        debounce: DebounceWindow,
        generation: u64,
        ingest_seq: u64,
    },
    Disarm {
        generation: u64,
    },
}

struct LiveWatch {
    path: PathBuf,
    generation: u64,
    handle: Box<dyn WatchHandle>,
}

pub(super) struct WatchSupervisor {
    primitive: Arc<dyn WatchPrimitive>,
    ingestor: DataIngestor,
    events: UnboundedSender<PipelineEvent>,
    current: Option<LiveWatch>,
}

impl WatchSupervisor {
    pub(super) fn new(
        primitive: Arc<dyn WatchPrimitive>,
        ingestor: DataIngestor,
        events: UnboundedSender<PipelineEvent>,
    ) -> Self {
        Self {
            primitive,
            ingestor,
            events,
            current: None,
        }
    }

    /// Start the supervisor task. Closing the returned sender releases the
    /// live handle and ends the task.
    pub(super) fn spawn(self) -> (UnboundedSender<SupervisorCommand>, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(self.run(rx));
        (tx, task)
    }

    async fn run(mut self, mut commands: UnboundedReceiver<SupervisorCommand>) {
        while let Some(command) = commands.recv().await {
            match command {
                SupervisorCommand::Arm {
                    path,
                    debounce,
                    generation,
                    ingest_seq,
                } => self.arm(path, debounce, generation, ingest_seq).await,
                SupervisorCommand::Disarm { generation } => {
                    crate::debug_event!("supervisor", "disarm", "generation {generation}");
                    self.release_current().await;
                }
            }
        }
        self.release_current().await;
    }

    async fn release_current(&mut self) {
        let Some(mut live) = self.current.take() else {
            return;
        };
        if let Err(e) = live.handle.release().await {
            tracing::warn!("[supervisor] {e}");
        }
        crate::log_event!(
            "supervisor",
            "released",
            "{} (generation {})",
            live.path.display(),
            live.generation
        );
    }

    async fn arm(&mut self, path: PathBuf, debounce: DebounceWindow, generation: u64, ingest_seq: u64) {
        self.release_current().await;

        // The snapshot must not lag behind a freshly armed watch
        self.ingestor.ingest(path.clone(), ingest_seq);

        let events = self.events.clone();
        let on_change: ChangeCallback = Arc::new(move || {
            let _ = events.send(PipelineEvent::Changed { generation });
        });
        let options = WatchOptions {
            delay: debounce.as_duration(),
        };

        let result = match self.primitive.watch(&path, options, on_change).await {
            Ok(handle) => {
                self.current = Some(LiveWatch {
                    path,
                    generation,
                    handle,
                });
                Ok(())
            }
            Err(e) => Err(e),
        };
        let _ = self.events.send(PipelineEvent::Armed { generation, result });
    }
}
