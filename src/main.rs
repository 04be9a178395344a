use clap::Parser;
use gamelog::Settings;
use gamelog::cli::commands::{check, config, watch};
use gamelog::cli::{Cli, Commands};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    }
    .map_err(|e| anyhow::anyhow!("Failed to load configuration: {e}"))?;

    gamelog::logging::init_with_config(&settings.logging);

    match cli.command {
        Commands::Watch { path, debounce_ms } => {
            watch::run_watch(&settings, path, debounce_ms).await
        }
        Commands::Check { path } => {
            let found = check::run_check(&settings, path).await?;
            if !found {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Config => config::run_config(&settings),
    }
}
