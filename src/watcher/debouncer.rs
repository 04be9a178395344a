//! Trailing-edge debouncing for file change events.
//!
//! Debouncing prevents re-parsing the log on every write when the game
//! flushes several lines in quick succession.

use std::time::{Duration, Instant};

/// Debounces change events for one watched file.
///
/// Records the time of the latest change and reports it once the file has
/// been quiet for the configured window.
#[derive(Debug)]
pub struct Debouncer {
    /// Time of the most recent unreported change.
    pending: Option<Instant>,
    /// How long the file must be stable before the change is reported.
    window: Duration,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            pending: None,
            window,
        }
    }

    /// Record a change event. Resets the debounce timer.
    pub fn record(&mut self) {
        self.pending = Some(Instant::now());
    }

    /// When the pending change becomes reportable, if there is one.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.map(|last_change| last_change + self.window)
    }

    /// Take the pending change if it has been stable for the window.
    pub fn take_ready(&mut self) -> bool {
        match self.pending {
            Some(last_change) if last_change.elapsed() >= self.window => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }
}
