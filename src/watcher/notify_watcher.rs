//! Watch primitive backed by `notify`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::debouncer::Debouncer;
use super::{ChangeCallback, WatchError, WatchHandle, WatchOptions, WatchPrimitive};

/// Watches a single file through the platform's native watcher.
///
/// The parent directory is watched non-recursively so that editors and
/// loggers that replace the file (write-then-rename) are still seen.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotifyWatcher;

impl NotifyWatcher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl WatchPrimitive for NotifyWatcher {
    async fn watch(
        &self,
        path: &Path,
        options: WatchOptions,
        on_change: ChangeCallback,
    ) -> Result<Box<dyn WatchHandle>, WatchError> {
        // Events carry canonical paths (e.g. /private/var on macOS)
        let target = tokio::fs::canonicalize(path)
            .await
            .unwrap_or_else(|_| path.to_path_buf());
        let dir = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let (tx, rx) = mpsc::unbounded_channel();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let _ = tx.send(res);
        })?;
        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(|e| WatchError::PathWatchFailed {
                path: dir.clone(),
                reason: e.to_string(),
            })?;

        crate::debug_event!(
            "watcher",
            "watching",
            "{} ({}ms)",
            target.display(),
            options.delay.as_millis()
        );

        let task = tokio::spawn(debounce_events(
            target.clone(),
            rx,
            Debouncer::new(options.delay),
            on_change,
        ));

        Ok(Box::new(NotifyWatchHandle {
            path: target,
            watcher: Some(watcher),
            task: Some(task),
        }))
    }
}

/// Handle for one `NotifyWatcher` subscription.
struct NotifyWatchHandle {
    path: PathBuf,
    /// Dropping the watcher stops the OS subscription.
    watcher: Option<RecommendedWatcher>,
    /// Debounce task that invokes the callback.
    task: Option<JoinHandle<()>>,
}

#[async_trait]
impl WatchHandle for NotifyWatchHandle {
    async fn release(&mut self) -> Result<(), WatchError> {
        let Some(task) = self.task.take() else {
            return Ok(());
        };
        drop(self.watcher.take());
        task.abort();
        match task.await {
            Ok(()) => {}
            Err(e) if e.is_cancelled() => {}
            Err(e) => {
                return Err(WatchError::ReleaseFailed {
                    path: self.path.clone(),
                    reason: e.to_string(),
                });
            }
        }
        crate::debug_event!("watcher", "released", "{}", self.path.display());
        Ok(())
    }
}

impl Drop for NotifyWatchHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Forward debounced changes of `target` to the callback until the channel closes.
async fn debounce_events(
    target: PathBuf,
    mut rx: mpsc::UnboundedReceiver<notify::Result<Event>>,
    mut debouncer: Debouncer,
    on_change: ChangeCallback,
) {
    loop {
        let deadline = debouncer.deadline();
        tokio::select! {
            received = rx.recv() => match received {
                Some(Ok(event)) => {
                    if is_relevant(&event, &target) {
                        debouncer.record();
                    }
                }
                Some(Err(e)) => {
                    tracing::warn!("[watcher] file watch error: {e}");
                }
                None => break,
            },
            _ = sleep_until(deadline) => {
                if debouncer.take_ready() {
                    crate::debug_event!("watcher", "changed", "{}", target.display());
                    on_change();
                }
            }
        }
    }
}

async fn sleep_until(deadline: Option<std::time::Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await,
        None => std::future::pending().await,
    }
}

/// Content changes, creation (replace-by-rename) and removal of the target file.
fn is_relevant(event: &Event, target: &Path) -> bool {
    matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    ) && event.paths.iter().any(|path| path == target)
}
