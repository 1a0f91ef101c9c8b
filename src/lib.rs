//! Out-of-band invocation and line tracing for web service handlers.
//!
//! The crate lets a caller pick one registered handler by `(path, method)`,
//! invoke it with arguments reconstructed from a raw JSON payload, and get
//! back the handler's declared source text, its return value, and a
//! line-by-line trace of named locals captured while the handler actually
//! ran. Handlers opt in by carrying [`trace_line!`] probes; when no trace
//! session is active the probes are near-free no-ops, so instrumented
//! handlers serve normal traffic unchanged.
//!
//! Top-level modules:
//! - [`routing`]  — route table, handler references, parameter metadata.
//! - [`tracer`]   — trace sessions, the thread-bound hook, value snapshots.
//! - [`runtime`]  — resolution, argument binding, instrumented invocation.
//! - [`protocol`] — serde wire contract for debug requests and replies.
//! - [`sample`]   — the built-in sample application used by the CLI demo.

pub mod cli;
pub mod protocol;
pub mod routing;
pub mod runtime;
pub mod sample;
pub mod tracer;

use thiserror::Error;

/// Errors produced by the debug engine itself.
///
/// Handler-raised errors are not represented here; they travel as plain
/// [`anyhow::Error`] values and are shaped into an execution failure at the
/// orchestrator boundary.
#[derive(Debug, Error)]
pub enum DebuggerError {
    /// No route in the table matches the requested path and method.
    #[error("endpoint not found: {method} {path}")]
    EndpointNotFound { path: String, method: String },

    /// A structured-model parameter rejected the payload. Binding stops at
    /// the offending parameter and the handler is never invoked.
    #[error("Failed to validate body for {parameter}: {message}")]
    ValidationFailure { parameter: String, message: String },

    /// A trace session is already active on this thread. The hook slot is a
    /// per-thread singleton; callers must serialize debug invocations.
    #[error("a trace session is already active on this thread")]
    TraceBusy,
}

pub type Result<T> = anyhow::Result<T>;

pub use routing::{CallArgs, Handler, HandlerRef, ParameterSpec, RouteDescriptor, RouteTable};
pub use runtime::DebugOrchestrator;
pub use tracer::{CodeId, LineEvent, TraceSession};
