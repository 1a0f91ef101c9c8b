//! The thread-bound trace hook and the probe entry points.
//!
//! The hook slot is a per-thread singleton: at most one [`TraceSession`] may
//! be active on a thread at any instant, and [`install`] refuses a second.
//! Installation hands back an RAII [`HookGuard`] whose drop clears the slot
//! on every exit path, so the hook can never outlive the invocation that
//! installed it — including on panic unwind.
//!
//! The guard holds an [`Rc`] and is therefore `!Send`. A future that awaits
//! across a live guard inherits that, which pins suspend-capable traces to
//! the installing thread; hosts run debug invocations on a current-thread
//! runtime. A probe firing on a thread with no active session remains a
//! silent no-op.

use crate::tracer::session::{CodeId, TraceSession};
use crate::DebuggerError;
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::debug;

thread_local! {
    static ACTIVE: RefCell<Option<Rc<RefCell<TraceSession>>>> = const { RefCell::new(None) };
}

/// Scoped ownership of this thread's hook slot.
pub struct HookGuard {
    session: Rc<RefCell<TraceSession>>,
}

/// Claim the hook slot and open a session targeting `target`.
///
/// Fails with [`DebuggerError::TraceBusy`] when a session is already active
/// on this thread.
pub fn install(target: CodeId) -> Result<HookGuard, DebuggerError> {
    ACTIVE.with(|slot| {
        let mut slot = slot.borrow_mut();
        if slot.is_some() {
            return Err(DebuggerError::TraceBusy);
        }
        debug!(code = target.as_str(), "installing trace hook");
        let session = Rc::new(RefCell::new(TraceSession::new(target)));
        *slot = Some(Rc::clone(&session));
        Ok(HookGuard { session })
    })
}

impl HookGuard {
    /// Release the hook and take the completed session.
    pub fn finish(self) -> TraceSession {
        let session = Rc::clone(&self.session);
        drop(self);
        match Rc::try_unwrap(session) {
            Ok(cell) => cell.into_inner(),
            // A stray clone can only exist while the slot still points at the
            // session; after drop this arm is unreachable in practice.
            Err(shared) => shared.borrow().clone(),
        }
    }
}

impl Drop for HookGuard {
    fn drop(&mut self) {
        ACTIVE.with(|slot| slot.borrow_mut().take());
        debug!("trace hook removed");
    }
}

/// Whether a trace session is active on this thread.
///
/// Probes check this before snapshotting locals so that uninstrumented
/// traffic pays a single thread-local read.
pub fn is_active() -> bool {
    ACTIVE.with(|slot| slot.borrow().is_some())
}

/// Report one line probe to this thread's session, if any.
pub fn emit(file: &'static str, line: u32, raw_path: &'static str, locals: Vec<(String, Value)>) {
    ACTIVE.with(|slot| {
        if let Some(session) = slot.borrow().as_ref() {
            session.borrow_mut().observe(file, line, raw_path, locals);
        }
    });
}

/// Full path of the enclosing function, as seen by the trace hook.
#[macro_export]
macro_rules! function_path {
    () => {{
        fn f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            std::any::type_name::<T>()
        }
        type_name_of(f)
    }};
}

/// Report the current line and a snapshot of the named locals.
///
/// Place one probe per traced line, listing the locals bound at that point:
///
/// ```ignore
/// let item_id = args.i64("item_id")?;
/// trace_line!(item_id);
/// ```
///
/// Expands to a no-op when no trace session is active on this thread.
#[macro_export]
macro_rules! trace_line {
    ($($local:ident),* $(,)?) => {
        if $crate::tracer::hook::is_active() {
            $crate::tracer::hook::emit(
                file!(),
                line!(),
                $crate::function_path!(),
                vec![$(
                    (stringify!($local).to_string(), $crate::tracer::value::serialize(&$local))
                ),*],
            );
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn target() -> CodeId {
        CodeId::of::<TestTarget>()
    }

    struct TestTarget;

    fn target_path() -> String {
        format!("{}::f", CodeId::of::<TestTarget>().as_str())
    }

    #[test]
    fn install_rejects_second_session() {
        let _guard = install(target()).unwrap();
        assert!(matches!(install(target()), Err(DebuggerError::TraceBusy)));
    }

    #[test]
    fn slot_is_free_after_finish() {
        let guard = install(target()).unwrap();
        let session = guard.finish();
        assert!(session.entries.is_empty());
        assert!(!is_active());
        drop(install(target()).unwrap());
    }

    #[test]
    fn emit_without_session_is_noop() {
        assert!(!is_active());
        emit("a.rs", 1, "demo::nobody::f", vec![]);
        assert!(!is_active());
    }

    #[test]
    fn slot_is_cleared_during_unwind() {
        let result = std::panic::catch_unwind(|| {
            let _guard = install(target()).unwrap();
            panic!("boom");
        });
        assert!(result.is_err());
        assert!(!is_active());
        drop(install(target()).unwrap());
    }

    #[test]
    fn probes_record_real_source_text() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "first line").unwrap();
        writeln!(file, "    let x = 1;").unwrap();
        let path: &'static str =
            Box::leak(file.path().to_string_lossy().into_owned().into_boxed_str());

        let guard = install(target()).unwrap();
        let raw: &'static str = Box::leak(target_path().into_boxed_str());
        emit(path, 2, raw, vec![("x".to_string(), json!(1))]);
        let session = guard.finish();

        assert_eq!(session.entries.len(), 1);
        assert_eq!(session.entries[0].code, "let x = 1;");
        assert_eq!(session.entries[0].line, 2);
    }
}
