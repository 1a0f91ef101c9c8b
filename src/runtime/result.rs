//! Outcome types for debug invocations and failure shaping.
//!
//! Every failure the engine can produce is folded into a [`DebugFailure`]
//! at the orchestrator boundary; nothing in this crate is allowed to crash
//! the host's serving loop.

use crate::tracer::LineEvent;
use crate::DebuggerError;
use serde_json::Value;

/// Which leg of the pipeline a debug invocation failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// No route matched the requested path and method.
    EndpointNotFound,
    /// A structured parameter rejected the payload; execution never started.
    Validation,
    /// The handler itself raised during traced execution.
    Execution,
}

/// A structured failure, safe to return to the caller.
#[derive(Debug, Clone)]
pub struct DebugFailure {
    pub kind: FailureKind,
    pub message: String,
    pub detail: Option<String>,
}

/// The declared source text of a handler and the line it starts on.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceView {
    pub source: String,
    pub start_line: u32,
}

/// The result of one debug invocation.
#[derive(Debug)]
pub enum DebugOutcome {
    Success {
        value: Value,
        trace: Vec<LineEvent>,
        source: String,
        start_line: u32,
    },
    Failure(DebugFailure),
}

impl DebugOutcome {
    pub fn failure(&self) -> Option<&DebugFailure> {
        match self {
            DebugOutcome::Failure(failure) => Some(failure),
            DebugOutcome::Success { .. } => None,
        }
    }
}

/// Fold an engine error into its client-facing failure.
///
/// Errors that are not part of the engine taxonomy (including the hook-busy
/// guard) surface as execution failures with the full error chain attached.
pub(crate) fn failure_from_error(err: &anyhow::Error) -> DebugFailure {
    match err.downcast_ref::<DebuggerError>() {
        Some(DebuggerError::EndpointNotFound { .. }) => DebugFailure {
            kind: FailureKind::EndpointNotFound,
            message: err.to_string(),
            detail: None,
        },
        Some(DebuggerError::ValidationFailure { .. }) => DebugFailure {
            kind: FailureKind::Validation,
            message: err.to_string(),
            detail: None,
        },
        _ => DebugFailure {
            kind: FailureKind::Execution,
            message: err.to_string(),
            detail: Some(format!("{:?}", err)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_maps_engine_errors_to_kinds() {
        let not_found: anyhow::Error = DebuggerError::EndpointNotFound {
            path: "/missing".to_string(),
            method: "GET".to_string(),
        }
        .into();
        let failure = failure_from_error(&not_found);
        assert_eq!(failure.kind, FailureKind::EndpointNotFound);
        assert!(failure.detail.is_none());

        let validation: anyhow::Error = DebuggerError::ValidationFailure {
            parameter: "item".to_string(),
            message: "missing field `name`".to_string(),
        }
        .into();
        let failure = failure_from_error(&validation);
        assert_eq!(failure.kind, FailureKind::Validation);
        assert!(failure.message.contains("item"));

        let other = anyhow::anyhow!("handler blew up");
        let failure = failure_from_error(&other);
        assert_eq!(failure.kind, FailureKind::Execution);
        assert!(failure.detail.is_some());
    }
}
