//! Watch command: run the pipeline until Ctrl-C.
//!
//! Snapshots go to stdout as one JSON object per line; status changes and
//! errors go to stderr.

use std::path::PathBuf;
use std::sync::Arc;

use crate::backend::RawSnapshot;
use crate::config::Settings;
use crate::pipeline::{PipelineBuilder, PipelineError, PipelineStatus, PublishedState};

/// Tracks what has already been printed so each change is reported once.
#[derive(Default)]
struct Reporter {
    status: Option<PipelineStatus>,
    snapshot: Option<Arc<RawSnapshot>>,
    error: Option<PipelineError>,
}

impl Reporter {
    fn report(&mut self, state: &PublishedState) -> anyhow::Result<()> {
        if self.status != Some(state.status) {
            self.status = Some(state.status);
            match &state.path {
                Some(path) => eprintln!("{}: {}", state.status, path.display()),
                None => eprintln!("{}", state.status),
            }
        }

        if state.last_error != self.error {
            self.error = state.last_error.clone();
            if let Some(error) = &self.error {
                eprintln!("error: {error}");
            }
        }

        let fresh = match (&state.snapshot, &self.snapshot) {
            (Some(new), Some(old)) => !Arc::ptr_eq(new, old),
            (Some(_), None) => true,
            _ => false,
        };
        if fresh {
            if let Some(snapshot) = &state.snapshot {
                println!("{}", serde_json::to_string(snapshot.as_ref())?);
            }
        }
        self.snapshot = state.snapshot.clone();
        Ok(())
    }
}

pub async fn run_watch(
    settings: &Settings,
    path: Option<PathBuf>,
    debounce_ms: Option<i64>,
) -> anyhow::Result<()> {
    let mut builder = PipelineBuilder::from_settings(settings);
    if let Some(path) = path {
        builder = builder.path(path);
    }
    if let Some(ms) = debounce_ms {
        builder = builder.debounce_ms(ms);
    }

    let controller = builder.spawn()?;
    let mut updates = controller.subscribe();
    let mut reporter = Reporter::default();

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    reporter.report(&updates.borrow_and_update().clone())?;
    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                reporter.report(&state)?;
            }
            _ = &mut ctrl_c => {
                crate::debug_event!("cli", "interrupted");
                break;
            }
        }
    }

    controller.shutdown().await.ok();
    Ok(())
}
