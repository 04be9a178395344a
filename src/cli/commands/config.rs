//! Config command.

use crate::config::Settings;

/// Run config command - display current configuration.
pub fn run_config(config: &Settings) -> anyhow::Result<()> {
    match Settings::config_path() {
        Some(path) => println!("# Settings file: {}", path.display()),
        None => println!("# No per-user settings location on this platform"),
    }
    println!("{}", config.to_toml()?);
    Ok(())
}
