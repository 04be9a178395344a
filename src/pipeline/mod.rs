//! Log-file watch pipeline.
//!
//! Four components cooperate on one event loop:
//!
//! ```text
//! PathResolver ──> ExistenceProbe ──> WatchSupervisor ──> DataIngestor
//!   (no path)       (path, !checked)   (path, exists)      (arm / change)
//! ```
//!
//! [`PipelineState`] holds every decision: its transition methods take an
//! event and return the [`Effect`]s to run. The event loop executes those
//! effects through the components, which report back as [`PipelineEvent`]s.
//! The supervisor runs as its own sequential task and is the only owner of
//! the live watch handle, so a release always completes before the next
//! subscription is created.

mod controller;
mod error;
mod ingestor;
mod probe;
mod resolver;
mod state;
mod supervisor;

pub use controller::{PipelineBuilder, PipelineController};
pub use error::{ControlError, PipelineError};
pub use state::{
    DEFAULT_DEBOUNCE_MS, DebounceWindow, PipelineState, PipelineStatus, PublishedState,
    WatchConfig,
};

use std::path::PathBuf;

use crate::backend::{BackendError, RawSnapshot};
use crate::watcher::WatchError;

/// Work requested by a state transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Ask the command layer for the default path.
    ResolvePath,
    /// Check that `path` exists. `epoch` identifies the path assignment.
    Probe { path: PathBuf, epoch: u64 },
    /// Release the current subscription, ingest once, then subscribe.
    Arm {
        path: PathBuf,
        debounce: DebounceWindow,
        generation: u64,
        ingest_seq: u64,
    },
    /// Release the current subscription, if any.
    Disarm { generation: u64 },
    /// Parse `path` and report the snapshot tagged with `seq`.
    Ingest { path: PathBuf, seq: u64 },
}

/// Completion reported back to the event loop.
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    Resolved(Result<PathBuf, BackendError>),
    Probed {
        epoch: u64,
        result: Result<bool, BackendError>,
    },
    Armed {
        generation: u64,
        result: Result<(), WatchError>,
    },
    Changed {
        generation: u64,
    },
    Ingested {
        path: PathBuf,
        seq: u64,
        result: Result<RawSnapshot, BackendError>,
    },
}
