use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
use cli::{Cli, Commands};

fn main() -> Result<()> {
    // Parse CLI arguments first to get verbosity level
    let cli = Cli::parse();

    // Initialize tracing with appropriate verbosity
    let filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    let runtime = tokio::runtime::Runtime::new()?;
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Run(args) => {
            info!("Run command: {:?}", args.source.source);
            runtime.block_on(cli::commands::run::execute(args, config))?;
        }
        Commands::Generate(args) => {
            info!("Generate command: {:?}", args.source.source);
            runtime.block_on(cli::commands::generate::execute(args, config))?;
        }
    }

    Ok(())
}
