//! Command-line interface for the demo driver.

pub mod commands;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::filter::LevelFilter;

#[derive(Parser)]
#[command(
    name = "handler-debug",
    version,
    about = "Invoke a registered handler out-of-band and capture a line trace"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch a handler's declared source text
    Source(SourceArgs),
    /// Invoke a handler under a trace session
    Debug(DebugArgs),
    /// List the sample application's registered endpoints
    Endpoints(EndpointsArgs),
}

#[derive(Args)]
pub struct SourceArgs {
    /// Route path or pattern, e.g. /items/{item_id}
    #[arg(long)]
    pub path: String,

    /// HTTP method of the route
    #[arg(long, default_value = "GET")]
    pub method: String,

    #[arg(long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

#[derive(Args)]
pub struct DebugArgs {
    /// Route path or pattern, e.g. /items/1
    #[arg(long)]
    pub path: String,

    /// HTTP method of the route
    #[arg(long, default_value = "GET")]
    pub method: String,

    /// Request payload as a JSON object
    #[arg(long, default_value = "{}")]
    pub body: String,

    #[arg(long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

#[derive(Args)]
pub struct EndpointsArgs {
    #[arg(long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    Trace,
}

impl Cli {
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::Trace,
            }
        }
    }
}

impl Verbosity {
    pub fn to_log_level(self) -> LevelFilter {
        match self {
            Verbosity::Quiet => LevelFilter::ERROR,
            Verbosity::Normal => LevelFilter::WARN,
            Verbosity::Verbose => LevelFilter::DEBUG,
            Verbosity::Trace => LevelFilter::TRACE,
        }
    }
}
