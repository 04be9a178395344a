//! Check command: resolve the path and probe it once, without watching.

use std::path::PathBuf;

use crate::backend::{CommandLayer, LocalCommands};
use crate::config::Settings;

pub async fn run_check(settings: &Settings, path: Option<PathBuf>) -> anyhow::Result<bool> {
    let commands = LocalCommands::from_settings(settings);
    let path = match path {
        Some(path) => path,
        None => commands.get_default_log_file_path().await?,
    };

    let exists = commands.check_log_file_exists(&path).await?;
    if exists {
        println!("found: {}", path.display());
    } else {
        println!("missing: {}", path.display());
    }
    Ok(exists)
}
