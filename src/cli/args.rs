//! CLI argument parsing using clap.

use clap::{
    Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use std::path::PathBuf;

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

#[derive(Parser, Debug)]
#[command(name = "gamelog")]
#[command(version, about = "Watch a game log file and stream parsed snapshots")]
#[command(styles = clap_cargo_style())]
pub struct Cli {
    /// Settings file (defaults to the per-user config location)
    #[arg(long, global = true, env = "GAMELOG_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Watch the log file and print each new snapshot as a JSON line
    Watch {
        /// Log file to watch (defaults to the configured or platform path)
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Debounce window in milliseconds (overrides config)
        #[arg(short, long, allow_negative_numbers = true)]
        debounce_ms: Option<i64>,
    },

    /// Resolve the log file path and check that it exists
    Check {
        /// Log file to check (defaults to the configured or platform path)
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// Display active settings
    Config,
}
