//! Implementations of the CLI subcommands against the sample application.

use crate::cli::{DebugArgs, EndpointsArgs, OutputFormat, SourceArgs};
use crate::protocol::{
    self, DebugReply, DebugRequest, EndpointInfo, ParameterInfo, SourceReply, SourceRequest,
};
use crate::runtime::DebugOrchestrator;
use crate::sample;
use crate::Result;
use anyhow::{anyhow, Context};
use colored::Colorize;
use itertools::Itertools;
use serde_json::Value;
use std::sync::Arc;

fn orchestrator() -> DebugOrchestrator {
    DebugOrchestrator::new(Arc::new(sample::sample_routes()))
}

pub fn source(args: SourceArgs) -> Result<()> {
    let request = SourceRequest {
        path: args.path,
        method: args.method,
    };
    let orchestrator = orchestrator();
    let reply = protocol::source_reply(orchestrator.fetch_source(&request.path, &request.method));
    match args.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reply)?),
        OutputFormat::Text => match &reply {
            SourceReply::Source { source, start_line } => {
                println!("{}", format!("// starts at line {start_line}").dimmed());
                println!("{source}");
            }
            SourceReply::Error { error } => println!("{} {error}", "error:".red().bold()),
        },
    }
    Ok(())
}

pub fn debug(args: DebugArgs) -> Result<()> {
    let body: Value = serde_json::from_str(&args.body).context("--body must be valid JSON")?;
    let Value::Object(body) = body else {
        return Err(anyhow!("--body must be a JSON object"));
    };
    let request = DebugRequest {
        path: args.path,
        method: args.method,
        body,
    };

    let orchestrator = orchestrator();
    // The trace hook is thread-affine, so the invocation runs on a
    // current-thread runtime.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let outcome =
        runtime.block_on(orchestrator.debug(&request.path, &request.method, request.body));
    let reply = DebugReply::from(outcome);

    match args.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reply)?),
        OutputFormat::Text => print_debug_text(&reply),
    }
    Ok(())
}

fn print_debug_text(reply: &DebugReply) {
    match reply {
        DebugReply::Success {
            result,
            trace,
            source,
            start_line,
        } => {
            println!("{}", format!("Source (starts at line {start_line})").bold());
            println!("{source}");
            println!();
            println!("{}", "Trace".bold());
            for event in trace {
                println!(
                    "{:>5}  {:<12} {}",
                    event.line.to_string().cyan(),
                    event.function.yellow(),
                    event.code
                );
                if !event.locals.is_empty() {
                    let locals = event
                        .locals
                        .iter()
                        .map(|(name, value)| format!("{name}={value}"))
                        .join(", ");
                    println!("       {}", locals.dimmed());
                }
            }
            println!();
            println!("{}", "Result".bold());
            println!("{result:#}");
        }
        DebugReply::Error { error, details } => {
            println!("{} {error}", "error:".red().bold());
            if let Some(details) = details {
                println!("{}", details.dimmed());
            }
        }
    }
}

pub fn endpoints(args: EndpointsArgs) -> Result<()> {
    let table = sample::sample_routes();
    let listing: Vec<EndpointInfo> = table
        .iter()
        .map(|route| EndpointInfo {
            method: route.method.clone(),
            path: route.path.clone(),
            suspending: route.is_suspending(),
            parameters: route
                .parameters
                .iter()
                .map(|p| ParameterInfo {
                    name: p.name.clone(),
                    kind: p.kind_name().to_string(),
                })
                .collect(),
        })
        .collect();

    match args.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&listing)?),
        OutputFormat::Text => {
            for endpoint in &listing {
                let suffix = if endpoint.suspending {
                    " (suspending)".dimmed().to_string()
                } else {
                    String::new()
                };
                println!("{:<7} {}{suffix}", endpoint.method.green(), endpoint.path);
                if !endpoint.parameters.is_empty() {
                    let params = endpoint
                        .parameters
                        .iter()
                        .map(|p| format!("{}: {}", p.name, p.kind))
                        .join(", ");
                    println!("        {}", params.dimmed());
                }
            }
        }
    }
    Ok(())
}
