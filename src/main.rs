use clap::Parser;
use tokio::signal;
use tracing::{error, info};

use arbscan::cli::{self, Cli, Commands};
use arbscan::config::Config;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let mut config = match Config::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            std::process::exit(1);
        }
    };

    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    if cli.json_logs {
        config.logging.format = "json".to_string();
    }
    config.init_logging();

    tokio::select! {
        result = dispatch(config, &cli.command) => {
            if let Err(e) = result {
                error!(error = %e, "Fatal error");
                std::process::exit(1);
            }
        }
        _ = signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
    }
}

async fn dispatch(config: Config, command: &Commands) -> arbscan::error::Result<()> {
    match command {
        Commands::Scan(args) => cli::scan::execute(config, args).await,
        Commands::Depth(args) => cli::depth::execute(config, args).await,
        Commands::Monitor(args) => cli::monitor::execute(config, args).await,
        Commands::Watch(args) => cli::watch::execute(config, args).await,
    }
}
