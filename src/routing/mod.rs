//! Route table and handler metadata consumed by the debug engine.
//!
//! The host service owns this data; the engine only reads it. Sub-modules:
//! - [`handler`] — concrete callables, wrapper chains, call arguments.
//! - [`table`]   — route descriptors, parameter metadata, source spans.

pub mod handler;
pub mod table;

pub use handler::{BlockingFn, CallArgs, Handler, HandlerKind, HandlerRef, HandlerResult, SuspendingFn};
pub use table::{ParameterKind, ParameterSpec, RouteDescriptor, RouteTable, SourceSpan};
