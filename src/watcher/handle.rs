//! Watch primitive and handle traits.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::WatchError;

/// Invoked once per debounced change. Must not block.
pub type ChangeCallback = Arc<dyn Fn() + Send + Sync>;

/// Options for a single subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchOptions {
    /// Debounce window: how long the file must stay quiet before a change is reported.
    pub delay: Duration,
}

/// A live subscription.
///
/// Once `release` returns, the callback is never invoked again.
/// Releasing more than once is a no-op.
#[async_trait]
pub trait WatchHandle: Send {
    async fn release(&mut self) -> Result<(), WatchError>;
}

/// Something that can watch a single file for changes.
#[async_trait]
pub trait WatchPrimitive: Send + Sync {
    async fn watch(
        &self,
        path: &Path,
        options: WatchOptions,
        on_change: ChangeCallback,
    ) -> Result<Box<dyn WatchHandle>, WatchError>;
}
