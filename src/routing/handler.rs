//! Handler callables and the wrapper chains that route tables store.

use crate::tracer::CodeId;
use anyhow::anyhow;
use futures_util::future::LocalBoxFuture;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::future::Future;
use std::sync::Arc;

/// What a handler returns: a JSON value or a handler-raised error.
pub type HandlerResult = crate::Result<Value>;

pub type BlockingFn = dyn Fn(CallArgs) -> HandlerResult + Send + Sync;
pub type SuspendingFn = dyn Fn(CallArgs) -> LocalBoxFuture<'static, HandlerResult> + Send + Sync;

/// Call-ready arguments bound from a raw payload.
///
/// Absent scalars are simply not present, so handler-side defaults apply.
#[derive(Debug, Clone, Default)]
pub struct CallArgs(Map<String, Value>);

impl CallArgs {
    pub fn insert(&mut self, name: String, value: Value) {
        self.0.insert(name, value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Required integer argument.
    pub fn i64(&self, name: &str) -> crate::Result<i64> {
        self.0
            .get(name)
            .and_then(Value::as_i64)
            .ok_or_else(|| anyhow!("missing or non-integer argument `{name}`"))
    }

    /// Optional string argument.
    pub fn str(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    /// Reconstruct a bound structured-model argument.
    pub fn model<T: DeserializeOwned>(&self, name: &str) -> crate::Result<T> {
        let value = self
            .0
            .get(name)
            .ok_or_else(|| anyhow!("missing model argument `{name}`"))?;
        Ok(serde_json::from_value(value.clone())?)
    }
}

/// The two execution shapes a concrete handler can have.
#[derive(Clone)]
pub enum HandlerKind {
    Blocking(Arc<BlockingFn>),
    Suspending(Arc<SuspendingFn>),
}

impl std::fmt::Debug for HandlerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HandlerKind::Blocking(_) => f.write_str("HandlerKind::Blocking"),
            HandlerKind::Suspending(_) => f.write_str("HandlerKind::Suspending"),
        }
    }
}

/// A concrete callable plus the code identity its probes report under.
#[derive(Clone, Debug)]
pub struct Handler {
    pub code: CodeId,
    pub kind: HandlerKind,
}

impl Handler {
    /// Register a blocking handler. Pass the function item itself so its
    /// type path survives as the code identity.
    pub fn blocking<F>(f: F) -> Self
    where
        F: Fn(CallArgs) -> HandlerResult + Send + Sync + 'static,
    {
        Handler {
            code: CodeId::of::<F>(),
            kind: HandlerKind::Blocking(Arc::new(f)),
        }
    }

    /// Register a suspend-capable handler from an async function item.
    pub fn suspending<F, Fut>(f: F) -> Self
    where
        F: Fn(CallArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + 'static,
    {
        Handler {
            code: CodeId::of::<F>(),
            kind: HandlerKind::Suspending(Arc::new(move |args| Box::pin(f(args)))),
        }
    }

    pub fn is_suspending(&self) -> bool {
        matches!(self.kind, HandlerKind::Suspending(_))
    }
}

/// A handler as stored in the route table: the concrete callable, possibly
/// behind named wrapper layers. Unwrapping walks the chain deterministically
/// to the innermost concrete callable, which is what tracing and signature
/// inspection must target.
#[derive(Clone, Debug)]
pub enum HandlerRef {
    Wrapped {
        layer: &'static str,
        inner: Box<HandlerRef>,
    },
    Concrete(Handler),
}

impl HandlerRef {
    /// Wrap this reference in a named layer.
    pub fn layered(self, layer: &'static str) -> Self {
        HandlerRef::Wrapped {
            layer,
            inner: Box::new(self),
        }
    }

    /// The innermost concrete callable.
    pub fn concrete(&self) -> &Handler {
        let mut current = self;
        loop {
            match current {
                HandlerRef::Wrapped { inner, .. } => current = inner,
                HandlerRef::Concrete(handler) => return handler,
            }
        }
    }

    /// Wrapper layer names, outermost first.
    pub fn layers(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        let mut current = self;
        while let HandlerRef::Wrapped { layer, inner } = current {
            names.push(*layer);
            current = inner;
        }
        names
    }
}

impl From<Handler> for HandlerRef {
    fn from(handler: Handler) -> Self {
        HandlerRef::Concrete(handler)
    }
}
