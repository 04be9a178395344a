//! Control surface and the event loop that drives the pipeline.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;

use super::error::ControlError;
use super::ingestor::DataIngestor;
use super::probe::ExistenceProbe;
use super::resolver::PathResolver;
use super::state::{DebounceWindow, PipelineState, PublishedState, WatchConfig};
use super::supervisor::{SupervisorCommand, WatchSupervisor};
use super::{Effect, PipelineEvent};
use crate::backend::{CommandLayer, LocalCommands};
use crate::config::Settings;
use crate::watcher::{NotifyWatcher, WatchPrimitive};

enum ControlMessage {
    SetPath(PathBuf),
    SetDebounce(DebounceWindow),
    Retry,
    Shutdown(oneshot::Sender<()>),
}

/// Builder for a running pipeline.
pub struct PipelineBuilder {
    commands: Option<Arc<dyn CommandLayer>>,
    watcher: Option<Arc<dyn WatchPrimitive>>,
    path: Option<PathBuf>,
    debounce: DebounceWindow,
}

impl PipelineBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            commands: None,
            watcher: None,
            path: None,
            debounce: DebounceWindow::default(),
        }
    }

    /// Local filesystem backends configured from settings.
    pub fn from_settings(settings: &Settings) -> Self {
        let builder = Self::new()
            .commands(LocalCommands::from_settings(settings))
            .watcher(NotifyWatcher::new());
        match DebounceWindow::new(settings.debounce_ms) {
            Some(debounce) => Self { debounce, ..builder },
            None => {
                tracing::warn!(
                    "[pipeline] debounce_ms must be positive, using {}",
                    builder.debounce
                );
                builder
            }
        }
    }

    /// Set the command layer.
    pub fn commands(mut self, commands: impl CommandLayer + 'static) -> Self {
        self.commands = Some(Arc::new(commands));
        self
    }

    /// Set the watch primitive.
    pub fn watcher(mut self, watcher: impl WatchPrimitive + 'static) -> Self {
        self.watcher = Some(Arc::new(watcher));
        self
    }

    /// Start with a known path instead of resolving the default.
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.path = (!path.as_os_str().is_empty()).then_some(path);
        self
    }

    /// Set the debounce window. Non-positive values are ignored.
    pub fn debounce_ms(mut self, ms: i64) -> Self {
        if let Some(debounce) = DebounceWindow::from_millis(ms) {
            self.debounce = debounce;
        }
        self
    }

    /// Spawn the pipeline on the current tokio runtime.
    pub fn spawn(self) -> Result<PipelineController, ControlError> {
        let commands = self.commands.ok_or_else(|| ControlError::InitFailed {
            reason: "Command layer is required".to_string(),
        })?;
        let watcher = self.watcher.ok_or_else(|| ControlError::InitFailed {
            reason: "Watch primitive is required".to_string(),
        })?;

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (control_tx, control_rx) = mpsc::unbounded_channel();

        let ingestor = DataIngestor::new(Arc::clone(&commands), event_tx.clone());
        let supervisor = WatchSupervisor::new(watcher, ingestor.clone(), event_tx.clone());
        let (supervisor_tx, supervisor_task) = supervisor.spawn();

        let mut state = PipelineState::new(WatchConfig::new(self.path, self.debounce));
        let initial = state.evaluate();
        let (state_tx, state_rx) = watch::channel(state.published());

        let event_loop = PipelineLoop {
            state,
            control_rx,
            event_rx,
            resolver: PathResolver::new(Arc::clone(&commands), event_tx.clone()),
            probe: ExistenceProbe::new(commands, event_tx),
            ingestor,
            supervisor_tx: Some(supervisor_tx),
            supervisor_task: Some(supervisor_task),
            published: state_tx,
        };
        event_loop.dispatch(initial);
        tokio::spawn(event_loop.run());

        Ok(PipelineController {
            control: control_tx,
            state: state_rx,
        })
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a running pipeline.
///
/// The setters are the only way to change the watch configuration; every
/// other field of [`PublishedState`] is derived. Dropping the last
/// controller shuts the pipeline down.
#[derive(Clone)]
pub struct PipelineController {
    control: UnboundedSender<ControlMessage>,
    state: watch::Receiver<PublishedState>,
}

impl PipelineController {
    /// Point the pipeline at a different file. Rejects an empty path.
    pub fn set_path(&self, path: impl Into<PathBuf>) -> Result<(), ControlError> {
        let path = path.into();
        if path.as_os_str().is_empty() {
            return Err(ControlError::EmptyPath);
        }
        self.send(ControlMessage::SetPath(path))
    }

    /// Change the debounce window. Zero and negative values are ignored.
    pub fn set_debounce_ms(&self, ms: i64) -> Result<(), ControlError> {
        match DebounceWindow::from_millis(ms) {
            Some(debounce) => self.send(ControlMessage::SetDebounce(debounce)),
            None => {
                crate::debug_event!("pipeline", "ignored debounce", "{ms}ms");
                Ok(())
            }
        }
    }

    /// Clear the last error and re-run the step that failed.
    pub fn retry(&self) -> Result<(), ControlError> {
        self.send(ControlMessage::Retry)
    }

    /// Current published state.
    pub fn state(&self) -> PublishedState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every observable change.
    pub fn subscribe(&self) -> watch::Receiver<PublishedState> {
        self.state.clone()
    }

    /// Wait until the published state satisfies `predicate`.
    pub async fn wait_for(
        &self,
        mut predicate: impl FnMut(&PublishedState) -> bool,
    ) -> Result<PublishedState, ControlError> {
        let mut rx = self.state.clone();
        let state = rx
            .wait_for(|state| predicate(state))
            .await
            .map_err(|_| ControlError::Closed)?;
        Ok(state.clone())
    }

    /// Release the live watch and stop the pipeline.
    pub async fn shutdown(&self) -> Result<(), ControlError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(ControlMessage::Shutdown(reply_tx))?;
        reply_rx.await.map_err(|_| ControlError::Closed)
    }

    fn send(&self, message: ControlMessage) -> Result<(), ControlError> {
        self.control.send(message).map_err(|_| ControlError::Closed)
    }
}

/// Single writer of the pipeline state.
struct PipelineLoop {
    state: PipelineState,
    control_rx: UnboundedReceiver<ControlMessage>,
    event_rx: UnboundedReceiver<PipelineEvent>,
    resolver: PathResolver,
    probe: ExistenceProbe,
    ingestor: DataIngestor,
    supervisor_tx: Option<UnboundedSender<SupervisorCommand>>,
    supervisor_task: Option<JoinHandle<()>>,
    published: watch::Sender<PublishedState>,
}

impl PipelineLoop {
    async fn run(mut self) {
        crate::log_event!("pipeline", "started");

        loop {
            let effects = tokio::select! {
                message = self.control_rx.recv() => match message {
                    Some(ControlMessage::SetPath(path)) => {
                        crate::log_event!("pipeline", "set path", "{}", path.display());
                        self.state.set_path(path)
                    }
                    Some(ControlMessage::SetDebounce(debounce)) => {
                        crate::log_event!("pipeline", "set debounce", "{debounce}");
                        self.state.set_debounce(debounce)
                    }
                    Some(ControlMessage::Retry) => {
                        crate::log_event!("pipeline", "retry");
                        self.state.retry()
                    }
                    Some(ControlMessage::Shutdown(reply)) => {
                        self.stop().await;
                        let _ = reply.send(());
                        return;
                    }
                    None => {
                        crate::debug_event!("pipeline", "all controllers dropped");
                        self.stop().await;
                        return;
                    }
                },
                Some(event) = self.event_rx.recv() => self.state.apply(event),
            };

            self.dispatch(effects);
            self.publish();
        }
    }

    fn dispatch(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::ResolvePath => self.resolver.resolve(),
                Effect::Probe { path, epoch } => self.probe.check(path, epoch),
                Effect::Arm {
                    path,
                    debounce,
                    generation,
                    ingest_seq,
                } => self.command_supervisor(SupervisorCommand::Arm {
                    path,
                    debounce,
                    generation,
                    ingest_seq,
                }),
                Effect::Disarm { generation } => {
                    self.command_supervisor(SupervisorCommand::Disarm { generation })
                }
                Effect::Ingest { path, seq } => self.ingestor.ingest(path, seq),
            }
        }
    }

    fn command_supervisor(&self, command: SupervisorCommand) {
        let Some(tx) = &self.supervisor_tx else {
            return;
        };
        if tx.send(command).is_err() {
            tracing::error!("[pipeline] watch supervisor stopped unexpectedly");
        }
    }

    fn publish(&self) {
        let next = self.state.published();
        self.published.send_if_modified(|current| {
            if current.differs_from(&next) {
                *current = next;
                true
            } else {
                false
            }
        });
    }

    async fn stop(&mut self) {
        let effects = self.state.shutdown();
        self.dispatch(effects);

        // Closing the command channel makes the supervisor release and exit
        self.supervisor_tx = None;
        if let Some(task) = self.supervisor_task.take() {
            if let Err(e) = task.await {
                tracing::error!("[pipeline] watch supervisor failed: {e}");
            }
        }

        self.publish();
        crate::log_event!("pipeline", "stopped");
    }
}
