//! netclass - Main Entry Point

use clap::Parser;
use netclass::cli::{cmd_info, cmd_softmax, cmd_tree, Cli, Commands};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "netclass=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Tree {
            data,
            max_depth,
            min_info_gain,
        } => {
            cmd_tree(&data, max_depth, min_info_gain)?;
        }
        Commands::Softmax {
            data,
            learning_rate,
            epochs,
            batch_size,
            verbose,
        } => {
            cmd_softmax(&data, learning_rate, epochs, batch_size, verbose)?;
        }
        Commands::Info { data } => {
            cmd_info(&data)?;
        }
    }

    Ok(())
}
