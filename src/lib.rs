pub mod backend;
pub mod cli;
pub mod config;
pub mod logging;
pub mod pipeline;
pub mod watcher;

pub use backend::{BackendError, CommandLayer, LocalCommands, RawSnapshot};
pub use config::Settings;
pub use pipeline::{
    ControlError, DebounceWindow, PipelineBuilder, PipelineController, PipelineError,
    PipelineStatus, PublishedState, WatchConfig,
};
pub use watcher::{NotifyWatcher, WatchError, WatchHandle, WatchOptions, WatchPrimitive};
