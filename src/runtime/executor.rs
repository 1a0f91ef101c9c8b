//! Public façade tying resolution, binding, and instrumented execution into
//! one request/response contract.

use crate::routing::{HandlerKind, RouteDescriptor, RouteTable};
use crate::runtime::result::{
    failure_from_error, DebugFailure, DebugOutcome, FailureKind, SourceView,
};
use crate::runtime::{binder, invoker, resolver};
use crate::Result;
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

const SOURCE_PLACEHOLDER: &str = "Source not available";

/// Services debug requests against an externally owned route table.
///
/// The per-line trace hook is a per-thread singleton, so debug invocations
/// are serialized through an internal gate: a second concurrent call queues
/// until the first completes instead of corrupting its trace.
pub struct DebugOrchestrator {
    routes: Arc<RouteTable>,
    gate: Mutex<()>,
}

impl DebugOrchestrator {
    pub fn new(routes: Arc<RouteTable>) -> Self {
        DebugOrchestrator {
            routes,
            gate: Mutex::new(()),
        }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Declared source text and start line for the handler at
    /// `(path, method)`.
    ///
    /// A route without a registered span degrades to a placeholder and line
    /// 0; only an unresolved route is a hard error.
    #[tracing::instrument(skip(self))]
    pub fn fetch_source(&self, path: &str, method: &str) -> Result<SourceView> {
        let resolved = resolver::resolve(&self.routes, path, method)?;
        info!(code = resolved.handler.code.as_str(), "resolved source target");
        Ok(source_view(resolved.route))
    }

    /// Invoke the handler at `(path, method)` under a trace session.
    ///
    /// Never returns an error and never panics: every failure is shaped into
    /// a [`DebugOutcome::Failure`] with its taxonomy kind.
    pub async fn debug(&self, path: &str, method: &str, body: Map<String, Value>) -> DebugOutcome {
        let _in_flight = self.gate.lock().await;
        match self.debug_locked(path, method, body).await {
            Ok(outcome) => outcome,
            Err(err) => DebugOutcome::Failure(failure_from_error(&err)),
        }
    }

    async fn debug_locked(
        &self,
        path: &str,
        method: &str,
        body: Map<String, Value>,
    ) -> Result<DebugOutcome> {
        let resolved = resolver::resolve(&self.routes, path, method)?;
        info!(code = resolved.handler.code.as_str(), "debugging handler");

        // Extracted path parameters are merged over the body payload; the
        // binder sees one pre-merged map.
        let mut payload = body;
        for (name, value) in resolved.path_params {
            payload.insert(name, value);
        }
        let args = binder::bind(&resolved.route.parameters, &payload)?;

        let handler = resolved.handler;
        let (result, session) = match &handler.kind {
            HandlerKind::Blocking(f) => invoker::run_blocking(handler.code, f.as_ref(), args)?,
            HandlerKind::Suspending(f) => {
                invoker::run_suspending(handler.code, f.as_ref(), args).await?
            }
        };

        let view = source_view(resolved.route);
        Ok(match result {
            Ok(value) => DebugOutcome::Success {
                value,
                trace: session.entries,
                source: view.source,
                start_line: view.start_line,
            },
            Err(err) => {
                // Partial trace entries are discarded on handler failure;
                // only successful runs return a trace.
                warn!(error = %err, "handler raised during traced execution");
                DebugOutcome::Failure(DebugFailure {
                    kind: FailureKind::Execution,
                    message: err.to_string(),
                    detail: Some(format!("{:?}", err)),
                })
            }
        })
    }
}

fn source_view(route: &RouteDescriptor) -> SourceView {
    match &route.source {
        Some(span) => SourceView {
            source: span.text.clone(),
            start_line: span.start_line,
        },
        None => SourceView {
            source: SOURCE_PLACEHOLDER.to_string(),
            start_line: 0,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::{CallArgs, Handler, HandlerResult};
    use serde_json::json;

    fn bare(_: CallArgs) -> HandlerResult {
        Ok(json!(null))
    }

    #[test]
    fn routes_without_spans_degrade_to_placeholder() {
        let mut table = RouteTable::new();
        table.route(RouteDescriptor::new("GET", "/bare", Handler::blocking(bare)));
        let orchestrator = DebugOrchestrator::new(Arc::new(table));
        let view = orchestrator.fetch_source("/bare", "GET").unwrap();
        assert_eq!(view.source, SOURCE_PLACEHOLDER);
        assert_eq!(view.start_line, 0);
    }

    #[test]
    fn fetch_source_on_missing_route_is_an_error() {
        let orchestrator = DebugOrchestrator::new(Arc::new(RouteTable::new()));
        assert!(orchestrator.fetch_source("/missing", "GET").is_err());
    }
}
