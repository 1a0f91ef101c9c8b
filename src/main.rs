use anyhow::Result;
use clap::Parser;
use handler_debugger::cli::{Cli, Commands};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();
    let verbosity = cli.verbosity();

    // Initialize logging with verbosity-aware level. Logs go to stderr so
    // JSON output on stdout stays machine-readable.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| verbosity.to_log_level().to_string().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Execute command
    match cli.command {
        Commands::Source(args) => {
            handler_debugger::cli::commands::source(args)?;
        }
        Commands::Debug(args) => {
            handler_debugger::cli::commands::debug(args)?;
        }
        Commands::Endpoints(args) => {
            handler_debugger::cli::commands::endpoints(args)?;
        }
    }

    Ok(())
}
