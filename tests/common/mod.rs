//! Scripted fakes of the command layer and the watch primitive.

#![allow(dead_code)]

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use gamelog::watcher::ChangeCallback;
use gamelog::{
    BackendError, CommandLayer, PipelineController, PublishedState, RawSnapshot, WatchError,
    WatchHandle, WatchOptions, WatchPrimitive,
};
use parking_lot::Mutex;
use serde_json::json;

#[derive(Default)]
struct CommandScript {
    default_path: Option<PathBuf>,
    existing: HashSet<PathBuf>,
    probe_error: bool,
    parse_error: bool,
    resolve_calls: usize,
    probe_calls: Vec<PathBuf>,
    parse_calls: Vec<PathBuf>,
}

/// Command layer answering from an in-memory script.
///
/// Each parse returns a one-entry snapshot `{"parse": n}` where `n` counts
/// parse calls, so tests can tell snapshots apart.
#[derive(Clone, Default)]
pub struct ScriptedCommands {
    script: Arc<Mutex<CommandScript>>,
}

impl ScriptedCommands {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_path(self, path: impl Into<PathBuf>) -> Self {
        self.set_default_path(Some(path.into()));
        self
    }

    pub fn with_file(self, path: impl Into<PathBuf>) -> Self {
        self.add_file(path);
        self
    }

    pub fn set_default_path(&self, path: Option<PathBuf>) {
        self.script.lock().default_path = path;
    }

    pub fn add_file(&self, path: impl Into<PathBuf>) {
        self.script.lock().existing.insert(path.into());
    }

    pub fn set_probe_error(&self, fail: bool) {
        self.script.lock().probe_error = fail;
    }

    pub fn set_parse_error(&self, fail: bool) {
        self.script.lock().parse_error = fail;
    }

    pub fn resolve_calls(&self) -> usize {
        self.script.lock().resolve_calls
    }

    pub fn probe_calls(&self) -> Vec<PathBuf> {
        self.script.lock().probe_calls.clone()
    }

    pub fn parse_calls(&self) -> Vec<PathBuf> {
        self.script.lock().parse_calls.clone()
    }
}

#[async_trait]
impl CommandLayer for ScriptedCommands {
    async fn get_default_log_file_path(&self) -> Result<PathBuf, BackendError> {
        let mut script = self.script.lock();
        script.resolve_calls += 1;
        script
            .default_path
            .clone()
            .ok_or_else(|| BackendError::NoDefaultPath {
                reason: "no default scripted".to_string(),
            })
    }

    async fn check_log_file_exists(&self, path: &Path) -> Result<bool, BackendError> {
        let mut script = self.script.lock();
        script.probe_calls.push(path.to_path_buf());
        if script.probe_error {
            return Err(BackendError::CommandFailed {
                reason: "probe scripted to fail".to_string(),
            });
        }
        Ok(script.existing.contains(path))
    }

    async fn parse_log_file_reverse(&self, path: &Path) -> Result<RawSnapshot, BackendError> {
        let mut script = self.script.lock();
        script.parse_calls.push(path.to_path_buf());
        if script.parse_error {
            return Err(BackendError::Io {
                path: path.to_path_buf(),
                reason: "parse scripted to fail".to_string(),
            });
        }
        let n = script.parse_calls.len();
        Ok(RawSnapshot::new(path, vec![json!({ "parse": n })], 1))
    }
}

struct Subscription {
    path: PathBuf,
    delay: Duration,
    callback: ChangeCallback,
}

#[derive(Default)]
struct WatchLog {
    live: usize,
    max_live: usize,
    history: Vec<String>,
    subscriptions: Vec<Subscription>,
    fail_next: bool,
}

/// Watch primitive that records subscriptions and lets tests fire changes.
#[derive(Clone, Default)]
pub struct FakeWatcher {
    log: Arc<Mutex<WatchLog>>,
}

impl FakeWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscriptions currently live.
    pub fn live(&self) -> usize {
        self.log.lock().live
    }

    /// Highest number of simultaneously live subscriptions seen.
    pub fn max_live(&self) -> usize {
        self.log.lock().max_live
    }

    /// `watch <path>` / `release <path>` in call order.
    pub fn history(&self) -> Vec<String> {
        self.log.lock().history.clone()
    }

    /// Every subscription ever created, with its debounce window.
    pub fn watched(&self) -> Vec<(PathBuf, Duration)> {
        self.log
            .lock()
            .subscriptions
            .iter()
            .map(|sub| (sub.path.clone(), sub.delay))
            .collect()
    }

    /// Make the next `watch` call fail.
    pub fn fail_next(&self) {
        self.log.lock().fail_next = true;
    }

    /// Invoke the callback of subscription `index`, even if it was released.
    pub fn fire(&self, index: usize) {
        let callback = Arc::clone(&self.log.lock().subscriptions[index].callback);
        callback();
    }

    pub fn fire_latest(&self) {
        let index = self.log.lock().subscriptions.len() - 1;
        self.fire(index);
    }
}

#[async_trait]
impl WatchPrimitive for FakeWatcher {
    async fn watch(
        &self,
        path: &Path,
        options: WatchOptions,
        on_change: ChangeCallback,
    ) -> Result<Box<dyn WatchHandle>, WatchError> {
        let mut log = self.log.lock();
        if log.fail_next {
            log.fail_next = false;
            return Err(WatchError::PathWatchFailed {
                path: path.to_path_buf(),
                reason: "watch scripted to fail".to_string(),
            });
        }

        log.live += 1;
        log.max_live = log.max_live.max(log.live);
        log.history.push(format!("watch {}", path.display()));
        log.subscriptions.push(Subscription {
            path: path.to_path_buf(),
            delay: options.delay,
            callback: on_change,
        });

        Ok(Box::new(FakeHandle {
            log: Arc::clone(&self.log),
            path: path.to_path_buf(),
            released: false,
        }))
    }
}

struct FakeHandle {
    log: Arc<Mutex<WatchLog>>,
    path: PathBuf,
    released: bool,
}

#[async_trait]
impl WatchHandle for FakeHandle {
    async fn release(&mut self) -> Result<(), WatchError> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        let mut log = self.log.lock();
        log.live -= 1;
        log.history.push(format!("release {}", self.path.display()));
        Ok(())
    }
}

/// Wait for the pipeline to reach a state, failing the test after 5 seconds.
pub async fn wait_until(
    controller: &PipelineController,
    predicate: impl FnMut(&PublishedState) -> bool,
) -> PublishedState {
    tokio::time::timeout(Duration::from_secs(5), controller.wait_for(predicate))
        .await
        .expect("timed out waiting for pipeline state")
        .expect("pipeline closed")
}

/// Let spawned tasks run to completion.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

/// Entry marker of a snapshot produced by `ScriptedCommands`.
pub fn parse_marker(state: &PublishedState) -> Option<u64> {
    state.snapshot.as_ref()?.latest()?.get("parse")?.as_u64()
}
