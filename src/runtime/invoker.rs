//! Instrumented handler invocation.
//!
//! This module contains the hot path for actually *calling* a resolved
//! handler. It wires together:
//! - Hook installation via [`crate::tracer::hook::install`].
//! - The call itself, with panics contained so the serving loop never dies.
//! - Guaranteed hook release on every exit path through the RAII guard.
//!
//! The handler's own result is *captured*, not propagated: callers receive
//! `(handler result, completed session)` so a failing handler still yields
//! the entries recorded before the failure.

use crate::routing::{BlockingFn, CallArgs, HandlerResult, SuspendingFn};
use crate::tracer::{hook, CodeId, TraceSession};
use crate::Result;
use anyhow::anyhow;
use futures_util::FutureExt;
use std::panic::AssertUnwindSafe;
use tracing::{info, warn};

/// Run a blocking handler under a trace session targeting `code`.
#[tracing::instrument(skip_all, fields(code = code.as_str()))]
pub fn run_blocking(
    code: CodeId,
    handler: &BlockingFn,
    args: CallArgs,
) -> Result<(HandlerResult, TraceSession)> {
    info!("executing blocking handler");
    let guard = hook::install(code)?;
    let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| handler(args)));
    let session = guard.finish();
    Ok((unwrap_outcome(outcome), session))
}

/// Run a suspend-capable handler under a trace session targeting `code`.
///
/// The hook guard is held across suspension points; because it is `!Send`,
/// the returned future must be driven on the installing thread, which keeps
/// lines executed after resumption inside the same session.
#[tracing::instrument(skip_all, fields(code = code.as_str()))]
pub async fn run_suspending(
    code: CodeId,
    handler: &SuspendingFn,
    args: CallArgs,
) -> Result<(HandlerResult, TraceSession)> {
    info!("executing suspending handler");
    let guard = hook::install(code)?;
    let outcome = AssertUnwindSafe(handler(args)).catch_unwind().await;
    let session = guard.finish();
    Ok((unwrap_outcome(outcome), session))
}

fn unwrap_outcome(
    outcome: std::result::Result<HandlerResult, Box<dyn std::any::Any + Send>>,
) -> HandlerResult {
    match outcome {
        Ok(result) => result,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            warn!(%message, "handler panicked during traced execution");
            Err(anyhow!("handler panicked: {message}"))
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace_line;
    use serde_json::json;

    fn doubles(args: CallArgs) -> HandlerResult {
        let n = args.i64("n")?;
        trace_line!(n);
        let doubled = n * 2;
        trace_line!(n, doubled);
        Ok(json!({ "doubled": doubled }))
    }

    fn fails(args: CallArgs) -> HandlerResult {
        let n = args.i64("n")?;
        trace_line!(n);
        anyhow::bail!("nope")
    }

    fn panics(_: CallArgs) -> HandlerResult {
        panic!("kaboom")
    }

    fn args(n: i64) -> CallArgs {
        let mut args = CallArgs::default();
        args.insert("n".to_string(), json!(n));
        args
    }

    struct UnrelatedTarget;

    fn code_of<F>(_: &F) -> CodeId {
        CodeId::of::<F>()
    }

    #[test]
    fn run_with_unmatched_target_never_arms() {
        let (result, session) =
            run_blocking(CodeId::of::<UnrelatedTarget>(), &doubles, args(3)).unwrap();
        assert_eq!(result.unwrap(), json!({ "doubled": 6 }));
        assert!(session.entries.is_empty());
    }

    #[test]
    fn armed_run_records_probes_and_result() {
        let (result, session) = run_blocking(code_of(&doubles), &doubles, args(3)).unwrap();
        assert_eq!(result.unwrap(), json!({ "doubled": 6 }));
        assert_eq!(session.entries.len(), 2);
        assert_eq!(session.entries[0].locals["n"], json!(3));
        assert_eq!(session.entries[1].locals["doubled"], json!(6));
        assert_eq!(session.entries[1].function, "doubles");
    }

    #[test]
    fn failing_handler_still_returns_partial_session() {
        let (result, session) = run_blocking(code_of(&fails), &fails, args(1)).unwrap();
        assert!(result.is_err());
        assert_eq!(session.entries.len(), 1);
        assert!(!hook::is_active());
    }

    #[test]
    fn panicking_handler_is_contained_and_releases_the_hook() {
        let (result, _session) = run_blocking(code_of(&panics), &panics, args(1)).unwrap();
        let err = result.unwrap_err();
        assert!(err.to_string().contains("kaboom"));
        assert!(!hook::is_active());
    }
}
