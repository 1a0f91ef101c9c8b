//! Trace capture sub-system.
//!
//! Sub-modules:
//! - [`value`]   — total serialization of arbitrary runtime values.
//! - [`session`] — per-invocation trace sessions and line events.
//! - [`hook`]    — the thread-bound hook slot and the probe entry points.

pub mod hook;
pub mod session;
pub mod value;

pub use hook::HookGuard;
pub use session::{CodeId, LineEvent, TraceSession};
