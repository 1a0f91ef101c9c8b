//! Per-invocation trace sessions.
//!
//! A [`TraceSession`] records one [`LineEvent`] per probe crossed while its
//! target callable runs. The session arms when it first sees a probe whose
//! code identity matches the target, latches that probe's file as the origin
//! source unit, and from then on records every probe in that file — helper
//! functions defined in the same file interleave with the target's own lines
//! in execution order. Probes from other files are skipped without removing
//! the hook, so deeper calls that re-enter the origin file are still seen.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;

/// Identity of a callable body, derived from the function item's type path.
///
/// Registration captures it via [`CodeId::of`] from the generic parameter of
/// the registered function; probes recompute the same path for their
/// enclosing function. The function item itself must be passed at
/// registration — casting to a `fn` pointer erases the item type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeId(&'static str);

impl CodeId {
    /// Identity of the function item type `F`.
    pub fn of<F>() -> Self {
        CodeId(normalize_path(std::any::type_name::<F>()))
    }

    pub fn as_str(self) -> &'static str {
        self.0
    }
}

/// Strip the probe-helper suffix and closure segments from a type path.
///
/// Probes name their enclosing function through a nested `fn f`, so the raw
/// path ends in `::f`; async bodies may add `::{{closure}}` segments.
pub(crate) fn normalize_path(mut path: &str) -> &str {
    if let Some(stripped) = path.strip_suffix("::f") {
        path = stripped;
    }
    while let Some(stripped) = path.strip_suffix("::{{closure}}") {
        path = stripped;
    }
    path
}

fn short_name(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}

/// One observed line: number, enclosing function, source text, and a
/// snapshot of the named locals at that point. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineEvent {
    pub line: u32,
    pub function: String,
    pub code: String,
    pub locals: Map<String, Value>,
}

/// Lazily loaded lines of the origin file, read at most once per session.
#[derive(Debug, Clone)]
enum SourceCache {
    Unread,
    Unavailable,
    Lines(Vec<String>),
}

/// The ephemeral record of line-by-line observations for one invocation.
#[derive(Debug, Clone)]
pub struct TraceSession {
    target: CodeId,
    origin_file: Option<&'static str>,
    pub entries: Vec<LineEvent>,
    armed: bool,
    source: SourceCache,
}

impl TraceSession {
    pub(crate) fn new(target: CodeId) -> Self {
        TraceSession {
            target,
            origin_file: None,
            entries: Vec::new(),
            armed: false,
            source: SourceCache::Unread,
        }
    }

    pub fn target(&self) -> CodeId {
        self.target
    }

    pub fn origin_file(&self) -> Option<&'static str> {
        self.origin_file
    }

    /// Feed one probe into the session.
    ///
    /// Unarmed sessions ignore everything except the target's own probes;
    /// armed sessions record probes from the origin file and skip the rest.
    pub(crate) fn observe(
        &mut self,
        file: &'static str,
        line: u32,
        raw_path: &str,
        locals: Vec<(String, Value)>,
    ) {
        let path = normalize_path(raw_path);
        if !self.armed {
            if path != self.target.as_str() {
                return;
            }
            self.armed = true;
            self.origin_file = Some(file);
        }
        if self.origin_file != Some(file) {
            return;
        }
        let code = self.source_line(file, line);
        self.entries.push(LineEvent {
            line,
            function: short_name(path).to_string(),
            code,
            locals: locals.into_iter().collect(),
        });
    }

    /// Literal source text at `line`, best-effort.
    fn source_line(&mut self, file: &str, line: u32) -> String {
        if matches!(self.source, SourceCache::Unread) {
            self.source = match fs::read_to_string(file) {
                Ok(text) => SourceCache::Lines(text.lines().map(str::to_string).collect()),
                Err(_) => SourceCache::Unavailable,
            };
        }
        match &self.source {
            SourceCache::Lines(lines) => lines
                .get(line.saturating_sub(1) as usize)
                .map(|l| l.trim().to_string())
                .unwrap_or_else(|| "<could not read source>".to_string()),
            _ => "<source unavailable>".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalize_strips_probe_helper_and_closures() {
        assert_eq!(normalize_path("a::b::read_item::f"), "a::b::read_item");
        assert_eq!(
            normalize_path("a::b::list_items::{{closure}}::f"),
            "a::b::list_items"
        );
        assert_eq!(normalize_path("a::b::read_item"), "a::b::read_item");
    }

    #[test]
    fn session_arms_only_on_target_identity() {
        let mut session = TraceSession::new(CodeId("demo::target"));
        session.observe("no/such/file.rs", 3, "demo::other::f", vec![]);
        assert!(session.entries.is_empty());

        session.observe("no/such/file.rs", 5, "demo::target::f", vec![]);
        assert_eq!(session.entries.len(), 1);
        assert_eq!(session.origin_file(), Some("no/such/file.rs"));
    }

    #[test]
    fn armed_session_filters_by_origin_file() {
        let mut session = TraceSession::new(CodeId("demo::target"));
        session.observe("a.rs", 1, "demo::target::f", vec![]);
        session.observe("b.rs", 2, "demo::elsewhere::f", vec![]);
        session.observe("a.rs", 3, "demo::helper::f", vec![]);
        assert_eq!(session.entries.len(), 2);
        assert_eq!(session.entries[1].function, "helper");
    }

    #[test]
    fn unreadable_origin_degrades_to_placeholder() {
        let mut session = TraceSession::new(CodeId("demo::target"));
        session.observe(
            "no/such/file.rs",
            7,
            "demo::target::f",
            vec![("x".to_string(), json!(1))],
        );
        assert_eq!(session.entries[0].code, "<source unavailable>");
        assert_eq!(session.entries[0].locals["x"], json!(1));
    }
}
