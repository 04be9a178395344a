//! Pipeline state container.
//!
//! Component-specific transitions live next to each component
//! (`resolver`, `probe`, `supervisor`, `ingestor`); this module holds the
//! shared data and the entry points the event loop calls.

use std::fmt;
use std::num::NonZeroU64;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use super::error::PipelineError;
use super::{Effect, PipelineEvent};
use crate::backend::RawSnapshot;

pub const DEFAULT_DEBOUNCE_MS: u64 = 2000;

/// Debounce window handed to the watch primitive.
///
/// Changes closer together than this are reported once, after the file has
/// been quiet for the whole window. The pipeline never polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DebounceWindow(NonZeroU64);

impl DebounceWindow {
    pub fn new(ms: u64) -> Option<Self> {
        NonZeroU64::new(ms).map(Self)
    }

    /// `None` for zero and negative input.
    pub fn from_millis(ms: i64) -> Option<Self> {
        u64::try_from(ms).ok().and_then(Self::new)
    }

    pub fn as_millis(self) -> u64 {
        self.0.get()
    }

    pub fn as_duration(self) -> Duration {
        Duration::from_millis(self.0.get())
    }
}

impl Default for DebounceWindow {
    fn default() -> Self {
        Self(NonZeroU64::new(DEFAULT_DEBOUNCE_MS).unwrap_or(NonZeroU64::MIN))
    }
}

impl fmt::Display for DebounceWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// Watch parameters. `path` and `debounce` are set from outside; the flags
/// are derived by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchConfig {
    pub path: Option<PathBuf>,
    /// An existence check has completed for the current `path`.
    pub checked: bool,
    /// Result of that check. Only meaningful when `checked` is true.
    pub exists: Option<bool>,
    pub debounce: DebounceWindow,
}

impl WatchConfig {
    pub fn new(path: Option<PathBuf>, debounce: DebounceWindow) -> Self {
        Self {
            path,
            checked: false,
            exists: None,
            debounce,
        }
    }

    /// Replace the path. The previous existence result never survives.
    pub fn set_path(&mut self, path: PathBuf) {
        self.path = Some(path);
        self.checked = false;
        self.exists = None;
    }

    pub fn record_probe(&mut self, exists: bool) {
        self.checked = true;
        self.exists = Some(exists);
    }

    /// The path to watch, once it is known to exist.
    pub fn armable_path(&self) -> Option<&Path> {
        if self.checked && self.exists == Some(true) {
            self.path.as_deref()
        } else {
            None
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self::new(None, DebounceWindow::default())
    }
}

/// Where the pipeline currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStatus {
    /// Waiting for the command layer to supply a default path.
    ResolvingPath,
    /// Existence check in flight.
    Probing,
    /// Nothing exists at `path`; nothing is watched.
    NotFound,
    /// Subscription requested but not yet confirmed.
    Arming,
    Watching,
    /// A step failed and is waiting for `retry` or a new path; see `last_error`.
    Stalled,
    Stopped,
}

impl PipelineStatus {
    pub fn is_watching(self) -> bool {
        matches!(self, Self::Watching)
    }
}

impl fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::ResolvingPath => "resolving path",
            Self::Probing => "checking file",
            Self::NotFound => "file not found",
            Self::Arming => "starting watch",
            Self::Watching => "watching",
            Self::Stalled => "stalled",
            Self::Stopped => "stopped",
        };
        f.write_str(label)
    }
}

/// What consumers see.
#[derive(Debug, Clone)]
pub struct PublishedState {
    pub path: Option<PathBuf>,
    pub checked: bool,
    pub exists: Option<bool>,
    pub debounce: DebounceWindow,
    pub snapshot: Option<Arc<RawSnapshot>>,
    pub status: PipelineStatus,
    pub last_error: Option<PipelineError>,
}

impl PublishedState {
    /// True when `other` differs in anything a consumer can observe.
    /// Snapshots compare by identity.
    pub(crate) fn differs_from(&self, other: &Self) -> bool {
        let same_snapshot = match (&self.snapshot, &other.snapshot) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        !same_snapshot
            || self.path != other.path
            || self.checked != other.checked
            || self.exists != other.exists
            || self.debounce != other.debounce
            || self.status != other.status
            || self.last_error != other.last_error
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ArmState {
    Idle,
    Pending,
    Live,
    Failed,
}

/// Parameters the supervisor was last asked to arm with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct ArmKey {
    pub(super) path: PathBuf,
    pub(super) debounce: DebounceWindow,
}

/// Explicit pipeline state with pure transitions.
///
/// Nothing here performs I/O. Every method returns the effects the caller
/// must run; completions come back through [`PipelineState::apply`].
#[derive(Debug)]
pub struct PipelineState {
    pub(super) config: WatchConfig,
    /// Bumped on every path assignment; tags probes.
    pub(super) path_epoch: u64,
    pub(super) resolving: bool,
    pub(super) resolve_failed: bool,
    /// Epoch of the probe in flight.
    pub(super) probing: Option<u64>,
    pub(super) probe_failed: bool,
    pub(super) armed: Option<ArmKey>,
    pub(super) arm_state: ArmState,
    /// Bumped on every arm and disarm; change notifications carry it.
    pub(super) generation: u64,
    pub(super) next_seq: u64,
    /// Highest ingestion seq applied, or discarded by a path change.
    pub(super) last_completed_seq: u64,
    pub(super) snapshot: Option<Arc<RawSnapshot>>,
    pub(super) last_error: Option<PipelineError>,
    pub(super) stopped: bool,
}

impl PipelineState {
    pub fn new(config: WatchConfig) -> Self {
        Self {
            config,
            path_epoch: 0,
            resolving: false,
            resolve_failed: false,
            probing: None,
            probe_failed: false,
            armed: None,
            arm_state: ArmState::Idle,
            generation: 0,
            next_seq: 0,
            last_completed_seq: 0,
            snapshot: None,
            last_error: None,
            stopped: false,
        }
    }

    pub fn config(&self) -> &WatchConfig {
        &self.config
    }

    pub fn set_path(&mut self, path: PathBuf) -> Vec<Effect> {
        self.change_path(path);
        self.evaluate()
    }

    pub fn set_debounce(&mut self, debounce: DebounceWindow) -> Vec<Effect> {
        self.config.debounce = debounce;
        self.evaluate()
    }

    /// Clear the last error and re-run whichever step had failed.
    pub fn retry(&mut self) -> Vec<Effect> {
        self.last_error = None;
        self.resolve_failed = false;
        self.probe_failed = false;
        if self.arm_state == ArmState::Failed {
            self.armed = None;
            self.arm_state = ArmState::Idle;
        }
        self.evaluate()
    }

    /// Stop reacting to anything and release the subscription.
    pub fn shutdown(&mut self) -> Vec<Effect> {
        if self.stopped {
            return Vec::new();
        }
        self.stopped = true;
        self.disarm().into_iter().collect()
    }

    pub fn apply(&mut self, event: PipelineEvent) -> Vec<Effect> {
        if self.stopped {
            return Vec::new();
        }
        let mut effects = Vec::new();
        match event {
            PipelineEvent::Resolved(result) => self.on_resolved(result),
            PipelineEvent::Probed { epoch, result } => self.on_probed(epoch, result),
            PipelineEvent::Armed { generation, result } => self.on_armed(generation, result),
            PipelineEvent::Changed { generation } => effects.extend(self.on_changed(generation)),
            PipelineEvent::Ingested { path, seq, result } => self.on_ingested(&path, seq, result),
        }
        effects.extend(self.evaluate());
        effects
    }

    /// Work out what each component should do next.
    pub fn evaluate(&mut self) -> Vec<Effect> {
        if self.stopped {
            return Vec::new();
        }
        let mut effects = Vec::new();
        effects.extend(self.next_resolution());
        effects.extend(self.next_probe());
        effects.extend(self.next_arm());
        effects
    }

    pub(super) fn change_path(&mut self, path: PathBuf) {
        self.config.set_path(path);
        self.path_epoch += 1;
        // Ingestions issued before this point belong to the previous assignment
        self.last_completed_seq = self.next_seq;
        self.probe_failed = false;
        self.snapshot = None;
        self.last_error = None;
    }

    pub fn status(&self) -> PipelineStatus {
        if self.stopped {
            return PipelineStatus::Stopped;
        }
        match (&self.config.path, self.config.checked, self.config.exists) {
            (None, _, _) if self.resolve_failed => PipelineStatus::Stalled,
            (None, _, _) => PipelineStatus::ResolvingPath,
            (Some(_), false, _) if self.probe_failed => PipelineStatus::Stalled,
            (Some(_), false, _) => PipelineStatus::Probing,
            (Some(_), true, Some(true)) => match self.arm_state {
                ArmState::Idle | ArmState::Pending => PipelineStatus::Arming,
                ArmState::Live => PipelineStatus::Watching,
                ArmState::Failed => PipelineStatus::Stalled,
            },
            (Some(_), true, _) => PipelineStatus::NotFound,
        }
    }

    pub fn published(&self) -> PublishedState {
        PublishedState {
            path: self.config.path.clone(),
            checked: self.config.checked,
            exists: self.config.exists,
            debounce: self.config.debounce,
            snapshot: self.snapshot.clone(),
            status: self.status(),
            last_error: self.last_error.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendError;
    use crate::watcher::WatchError;

    fn window(ms: u64) -> DebounceWindow {
        DebounceWindow::new(ms).unwrap()
    }

    fn snapshot(path: &str, marker: i64) -> RawSnapshot {
        RawSnapshot::new(path, vec![serde_json::json!({ "n": marker })], 1)
    }

    /// Drive a fresh state to an armed watch on `path`; returns the arm effect.
    fn armed_state(path: &str) -> (PipelineState, Effect) {
        let mut state = PipelineState::new(WatchConfig::new(Some(path.into()), window(2000)));
        let effects = state.evaluate();
        let epoch = match &effects[..] {
            [Effect::Probe { epoch, .. }] => *epoch,
            other => panic!("expected probe, got {other:?}"),
        };
        let mut effects = state.apply(PipelineEvent::Probed {
            epoch,
            result: Ok(true),
        });
        assert_eq!(effects.len(), 1);
        (state, effects.remove(0))
    }

    fn arm_generation(effect: &Effect) -> u64 {
        match effect {
            Effect::Arm { generation, .. } => *generation,
            other => panic!("expected arm, got {other:?}"),
        }
    }

    #[test]
    fn test_debounce_window_rejects_non_positive() {
        assert_eq!(DebounceWindow::from_millis(0), None);
        assert_eq!(DebounceWindow::from_millis(-5), None);
        assert_eq!(DebounceWindow::from_millis(500).map(|w| w.as_millis()), Some(500));
        assert_eq!(DebounceWindow::default().as_millis(), DEFAULT_DEBOUNCE_MS);
        assert_eq!(window(250).as_duration(), Duration::from_millis(250));
    }

    #[test]
    fn test_unset_path_requests_resolution_once() {
        let mut state = PipelineState::new(WatchConfig::default());
        assert_eq!(state.evaluate(), vec![Effect::ResolvePath]);
        // Still in flight: no second request
        assert!(state.evaluate().is_empty());
        assert_eq!(state.status(), PipelineStatus::ResolvingPath);
    }

    #[test]
    fn test_resolution_sets_path_and_probes() {
        let mut state = PipelineState::new(WatchConfig::default());
        state.evaluate();

        let effects = state.apply(PipelineEvent::Resolved(Ok("/var/log/game.log".into())));
        assert_eq!(
            effects,
            vec![Effect::Probe {
                path: "/var/log/game.log".into(),
                epoch: 1
            }]
        );
        assert_eq!(state.config().path.as_deref(), Some(Path::new("/var/log/game.log")));
        assert!(!state.config().checked);
        assert_eq!(state.status(), PipelineStatus::Probing);
    }

    #[test]
    fn test_resolution_failure_stalls_until_retry() {
        let mut state = PipelineState::new(WatchConfig::default());
        state.evaluate();

        let effects = state.apply(PipelineEvent::Resolved(Err(BackendError::NoDefaultPath {
            reason: "no data dir".to_string(),
        })));
        assert!(effects.is_empty());
        assert!(state.config().path.is_none());
        assert_eq!(state.status(), PipelineStatus::Stalled);
        assert!(matches!(
            state.published().last_error,
            Some(PipelineError::Resolution { .. })
        ));

        assert_eq!(state.retry(), vec![Effect::ResolvePath]);
        assert!(state.published().last_error.is_none());
    }

    #[test]
    fn test_empty_resolved_path_is_a_failure() {
        let mut state = PipelineState::new(WatchConfig::default());
        state.evaluate();
        state.apply(PipelineEvent::Resolved(Ok(PathBuf::new())));
        assert!(state.config().path.is_none());
        assert_eq!(state.status(), PipelineStatus::Stalled);
    }

    #[test]
    fn test_late_resolution_does_not_override_user_path() {
        let mut state = PipelineState::new(WatchConfig::default());
        state.evaluate();
        state.set_path("/user/game.log".into());

        let effects = state.apply(PipelineEvent::Resolved(Ok("/default/game.log".into())));
        assert!(effects.is_empty());
        assert_eq!(state.config().path.as_deref(), Some(Path::new("/user/game.log")));
    }

    #[test]
    fn test_set_path_resets_existence() {
        let (mut state, _) = armed_state("/a.log");
        assert!(state.config().checked);
        assert_eq!(state.config().exists, Some(true));

        for path in ["/b.log", "/c.log", "/c.log"] {
            state.set_path(path.into());
            assert!(!state.config().checked);
            assert_eq!(state.config().exists, None);
            let published = state.published();
            assert!(!published.checked);
            assert_eq!(published.exists, None);
        }
    }

    #[test]
    fn test_missing_file_is_never_armed() {
        let mut state = PipelineState::new(WatchConfig::new(Some("/missing".into()), window(2000)));
        state.evaluate();
        let effects = state.apply(PipelineEvent::Probed {
            epoch: 0,
            result: Ok(false),
        });
        assert!(effects.is_empty());
        assert_eq!(state.status(), PipelineStatus::NotFound);
        assert!(state.config().checked);
        assert_eq!(state.config().exists, Some(false));
    }

    #[test]
    fn test_stale_probe_is_discarded() {
        let mut state = PipelineState::new(WatchConfig::new(Some("/a.log".into()), window(2000)));
        state.evaluate();
        let effects = state.set_path("/b.log".into());
        assert_eq!(
            effects,
            vec![Effect::Probe {
                path: "/b.log".into(),
                epoch: 1
            }]
        );

        // Result for /a.log arrives after the path changed
        let effects = state.apply(PipelineEvent::Probed {
            epoch: 0,
            result: Ok(true),
        });
        assert!(effects.is_empty());
        assert!(!state.config().checked);
        assert_eq!(state.status(), PipelineStatus::Probing);
    }

    #[test]
    fn test_probe_failure_keeps_unchecked() {
        let mut state = PipelineState::new(WatchConfig::new(Some("/a.log".into()), window(2000)));
        state.evaluate();
        state.apply(PipelineEvent::Probed {
            epoch: 0,
            result: Err(BackendError::CommandFailed {
                reason: "denied".to_string(),
            }),
        });
        assert!(!state.config().checked);
        assert_eq!(state.config().exists, None);
        assert_eq!(state.status(), PipelineStatus::Stalled);

        assert_eq!(
            state.retry(),
            vec![Effect::Probe {
                path: "/a.log".into(),
                epoch: 0
            }]
        );
    }

    #[test]
    fn test_arm_includes_ingestion_and_interval() {
        let (state, effect) = armed_state("/var/log/game.log");
        assert_eq!(
            effect,
            Effect::Arm {
                path: "/var/log/game.log".into(),
                debounce: window(2000),
                generation: 1,
                ingest_seq: 1,
            }
        );
        assert_eq!(state.status(), PipelineStatus::Arming);
    }

    #[test]
    fn test_armed_confirmation_and_failure() {
        let (mut state, effect) = armed_state("/a.log");
        let generation = arm_generation(&effect);

        state.apply(PipelineEvent::Armed {
            generation,
            result: Ok(()),
        });
        assert_eq!(state.status(), PipelineStatus::Watching);

        let (mut failed, effect) = armed_state("/a.log");
        let effects = failed.apply(PipelineEvent::Armed {
            generation: arm_generation(&effect),
            result: Err(WatchError::InitFailed {
                reason: "inotify limit".to_string(),
            }),
        });
        // No automatic re-arm
        assert!(effects.is_empty());
        assert_eq!(failed.status(), PipelineStatus::Stalled);
        assert!(matches!(
            failed.published().last_error,
            Some(PipelineError::Subscription { .. })
        ));

        let effects = failed.retry();
        assert!(matches!(effects[..], [Effect::Arm { generation: 2, .. }]));
    }

    #[test]
    fn test_change_notification_requests_one_ingestion() {
        let (mut state, effect) = armed_state("/a.log");
        let generation = arm_generation(&effect);
        state.apply(PipelineEvent::Armed {
            generation,
            result: Ok(()),
        });

        let effects = state.apply(PipelineEvent::Changed { generation });
        assert_eq!(
            effects,
            vec![Effect::Ingest {
                path: "/a.log".into(),
                seq: 2
            }]
        );
    }

    #[test]
    fn test_stale_generation_change_is_ignored() {
        let (mut state, effect) = armed_state("/a.log");
        let old_generation = arm_generation(&effect);
        state.apply(PipelineEvent::Armed {
            generation: old_generation,
            result: Ok(()),
        });

        let effects = state.set_path("/b.log".into());
        assert!(effects.contains(&Effect::Disarm {
            generation: old_generation + 1
        }));

        let effects = state.apply(PipelineEvent::Changed {
            generation: old_generation,
        });
        assert!(effects.is_empty());
    }

    #[test]
    fn test_debounce_change_rearms_only_when_armed() {
        let mut idle = PipelineState::new(WatchConfig::new(Some("/missing".into()), window(2000)));
        idle.evaluate();
        idle.apply(PipelineEvent::Probed {
            epoch: 0,
            result: Ok(false),
        });
        assert!(idle.set_debounce(window(500)).is_empty());
        assert_eq!(idle.config().debounce, window(500));

        let (mut state, _) = armed_state("/a.log");
        let effects = state.set_debounce(window(500));
        assert!(matches!(
            &effects[..],
            [Effect::Arm { debounce, generation: 2, ingest_seq: 2, .. }] if *debounce == window(500)
        ));

        // Same value again changes nothing
        assert!(state.set_debounce(window(500)).is_empty());
    }

    #[test]
    fn test_ingestion_replaces_snapshot() {
        let (mut state, _) = armed_state("/a.log");
        state.apply(PipelineEvent::Ingested {
            path: "/a.log".into(),
            seq: 1,
            result: Ok(snapshot("/a.log", 1)),
        });
        state.apply(PipelineEvent::Ingested {
            path: "/a.log".into(),
            seq: 2,
            result: Ok(snapshot("/a.log", 2)),
        });

        let published = state.published();
        let current = published.snapshot.unwrap();
        assert_eq!(current.entries, vec![serde_json::json!({ "n": 2 })]);
    }

    #[test]
    fn test_out_of_order_ingestion_is_discarded() {
        let (mut state, _) = armed_state("/a.log");
        state.apply(PipelineEvent::Ingested {
            path: "/a.log".into(),
            seq: 3,
            result: Ok(snapshot("/a.log", 3)),
        });
        state.apply(PipelineEvent::Ingested {
            path: "/a.log".into(),
            seq: 2,
            result: Ok(snapshot("/a.log", 2)),
        });

        let current = state.published().snapshot.unwrap();
        assert_eq!(current.entries, vec![serde_json::json!({ "n": 3 })]);
    }

    #[test]
    fn test_older_success_does_not_hide_newer_failure() {
        let (mut state, _) = armed_state("/a.log");
        state.apply(PipelineEvent::Ingested {
            path: "/a.log".into(),
            seq: 2,
            result: Err(BackendError::Io {
                path: "/a.log".into(),
                reason: "locked".to_string(),
            }),
        });
        state.apply(PipelineEvent::Ingested {
            path: "/a.log".into(),
            seq: 1,
            result: Ok(snapshot("/a.log", 1)),
        });

        let published = state.published();
        assert!(matches!(published.last_error, Some(PipelineError::Ingestion { .. })));
        assert!(published.snapshot.is_none());
    }

    #[test]
    fn test_ingestion_from_before_path_round_trip_is_discarded() {
        let (mut state, effect) = armed_state("/a.log");
        let stale_seq = match effect {
            Effect::Arm { ingest_seq, .. } => ingest_seq,
            other => panic!("expected arm, got {other:?}"),
        };

        state.set_path("/b.log".into());
        state.set_path("/a.log".into());
        state.apply(PipelineEvent::Ingested {
            path: "/a.log".into(),
            seq: stale_seq,
            result: Ok(snapshot("/a.log", 1)),
        });
        assert!(state.published().snapshot.is_none());

        // The re-arm for the returning path is still accepted
        let epoch = state.path_epoch;
        let effects = state.apply(PipelineEvent::Probed {
            epoch,
            result: Ok(true),
        });
        let fresh_seq = match &effects[..] {
            [Effect::Arm { ingest_seq, .. }] => *ingest_seq,
            other => panic!("expected arm, got {other:?}"),
        };
        state.apply(PipelineEvent::Ingested {
            path: "/a.log".into(),
            seq: fresh_seq,
            result: Ok(snapshot("/a.log", 2)),
        });
        assert_eq!(
            state.published().snapshot.unwrap().entries,
            vec![serde_json::json!({ "n": 2 })]
        );
    }

    #[test]
    fn test_ingestion_for_old_path_is_discarded() {
        let (mut state, _) = armed_state("/a.log");
        state.set_path("/b.log".into());
        state.apply(PipelineEvent::Ingested {
            path: "/a.log".into(),
            seq: 1,
            result: Ok(snapshot("/a.log", 1)),
        });
        assert!(state.published().snapshot.is_none());
    }

    #[test]
    fn test_ingestion_failure_keeps_previous_snapshot() {
        let (mut state, effect) = armed_state("/a.log");
        state.apply(PipelineEvent::Armed {
            generation: arm_generation(&effect),
            result: Ok(()),
        });
        state.apply(PipelineEvent::Ingested {
            path: "/a.log".into(),
            seq: 1,
            result: Ok(snapshot("/a.log", 1)),
        });
        state.apply(PipelineEvent::Ingested {
            path: "/a.log".into(),
            seq: 2,
            result: Err(BackendError::Io {
                path: "/a.log".into(),
                reason: "locked".to_string(),
            }),
        });

        let published = state.published();
        assert_eq!(published.status, PipelineStatus::Watching);
        assert!(matches!(published.last_error, Some(PipelineError::Ingestion { .. })));
        assert_eq!(
            published.snapshot.unwrap().entries,
            vec![serde_json::json!({ "n": 1 })]
        );

        // A later success clears the ingestion error
        state.apply(PipelineEvent::Ingested {
            path: "/a.log".into(),
            seq: 3,
            result: Ok(snapshot("/a.log", 3)),
        });
        assert!(state.published().last_error.is_none());
    }

    #[test]
    fn test_shutdown_disarms_and_ignores_events() {
        let (mut state, effect) = armed_state("/a.log");
        let generation = arm_generation(&effect);
        state.apply(PipelineEvent::Armed {
            generation,
            result: Ok(()),
        });

        assert_eq!(
            state.shutdown(),
            vec![Effect::Disarm {
                generation: generation + 1
            }]
        );
        assert_eq!(state.status(), PipelineStatus::Stopped);
        assert!(state.shutdown().is_empty());
        assert!(state.apply(PipelineEvent::Changed { generation }).is_empty());
        assert!(state.set_path("/b.log".into()).is_empty());
    }

    #[test]
    fn test_published_state_compares_snapshot_identity() {
        let (mut state, _) = armed_state("/a.log");
        let before = state.published();
        assert!(!before.differs_from(&state.published()));

        state.apply(PipelineEvent::Ingested {
            path: "/a.log".into(),
            seq: 1,
            result: Ok(snapshot("/a.log", 1)),
        });
        assert!(before.differs_from(&state.published()));
    }
}
