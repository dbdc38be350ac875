pub mod handlers;

use crate::presentation::cli::{Cli, Commands};
use clap::Parser;
use hamming_core::{Config, Result};
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Run {
            input,
            out_dir,
            level,
            seed,
            max_bytes,
            json,
        } => {
            let config = Config {
                max_file_bytes: max_bytes.unwrap_or(config.max_file_bytes),
                level: level.unwrap_or(config.level),
                corrupt_seed: seed.or(config.corrupt_seed),
            };
            handlers::handle_run(config, input, out_dir, json).await
        }
        Commands::Names { name } => handlers::handle_names(&name),
        Commands::Classify { input } => handlers::handle_classify(&config, input).await,
        Commands::Encode { input, out, level } => {
            let config = Config {
                level: level.unwrap_or(config.level),
                ..config
            };
            handlers::handle_encode(&config, input, out)
        }
        Commands::Corrupt { input, out, seed } => {
            let config = Config {
                corrupt_seed: seed.or(config.corrupt_seed),
                ..config
            };
            handlers::handle_corrupt(&config, input, out)
        }
        Commands::Decode { input, out, no_fix } => handlers::handle_decode(&config, input, out, no_fix),
    }
}
