//! Filesystem watch primitive.
//!
//! The pipeline subscribes to change notifications through [`WatchPrimitive`]
//! and owns the returned [`WatchHandle`]. [`NotifyWatcher`] is the
//! implementation backed by the OS watcher.
//!
//! # Architecture
//!
//! ```text
//! notify::RecommendedWatcher (parent dir, non-recursive)
//!         |
//!     filter: target file only
//!         |
//!     Debouncer (trailing edge, per handle)
//!         |
//!     on_change()
//! ```

mod debouncer;
mod error;
mod handle;
mod notify_watcher;

pub use debouncer::Debouncer;
pub use error::WatchError;
pub use handle::{ChangeCallback, WatchHandle, WatchOptions, WatchPrimitive};
pub use notify_watcher::NotifyWatcher;
