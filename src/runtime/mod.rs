//! Debug invocation pipeline.
//!
//! Sub-modules:
//! - [`executor`] — Public façade; coordinates all sub-modules.
//! - [`resolver`] — Route lookup and handler unwrapping.
//! - [`binder`]   — Payload-to-argument binding from declared parameters.
//! - [`invoker`]  — Instrumented execution with guaranteed hook release.
//! - [`result`]   — Shared outcome types and failure shaping.

pub mod binder;
pub mod executor;
pub mod invoker;
pub mod resolver;
pub mod result;

// Top-level re-exports.
pub use executor::DebugOrchestrator;
pub use result::{DebugFailure, DebugOutcome, FailureKind, SourceView};
