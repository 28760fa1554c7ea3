use anyhow::Result;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
use cli::{Cli, Commands};

fn main() -> Result<()> {
    // Parse CLI arguments first to get verbosity level
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    // stdout carries the JSON result, logs go to stderr
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    let config = cli.config.as_deref();
    let runtime = tokio::runtime::Runtime::new()?;

    match cli.command {
        Commands::Extract(args) => {
            debug!("Extract command: {:?}", args);
            runtime.block_on(cli::commands::extract::execute(args, config))?;
        }
        Commands::Refine(args) => {
            debug!("Refine command: {:?}", args);
            runtime.block_on(cli::commands::refine::execute(args, config))?;
        }
        Commands::Generate(args) => {
            debug!("Generate command: {:?}", args);
            runtime.block_on(cli::commands::generate::execute(args, config))?;
        }
    }

    Ok(())
}
