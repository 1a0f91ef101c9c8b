//! Route descriptors, parameter metadata, and declared source spans.

use crate::routing::handler::{Handler, HandlerRef};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Builds a structured-model value from the entire payload, or reports the
/// validation error as a message.
pub type ModelConstructor =
    dyn Fn(&Map<String, Value>) -> Result<Value, String> + Send + Sync;

/// How a declared parameter consumes the payload.
///
/// The structured-model capability is resolved once at registration time and
/// carried as an explicit tag, not re-derived per request.
#[derive(Clone)]
pub enum ParameterKind {
    /// Copied through from the payload by name when present, omitted when
    /// absent.
    Scalar,
    /// Constructed from the entire payload; construction failure aborts the
    /// whole binding.
    Model { construct: Arc<ModelConstructor> },
}

impl fmt::Debug for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterKind::Scalar => write!(f, "Scalar"),
            ParameterKind::Model { .. } => write!(f, "Model"),
        }
    }
}

/// One declared parameter of a handler's signature.
#[derive(Debug, Clone)]
pub struct ParameterSpec {
    pub name: String,
    pub kind: ParameterKind,
}

impl ParameterSpec {
    pub fn scalar(name: &str) -> Self {
        ParameterSpec {
            name: name.to_string(),
            kind: ParameterKind::Scalar,
        }
    }

    /// Declare a structured-model parameter of record type `T`.
    ///
    /// Construction deserializes the whole payload into `T` and re-encodes
    /// it, so defaults are applied and unknown keys are dropped before the
    /// handler sees the value.
    pub fn model<T: DeserializeOwned + Serialize>(name: &str) -> Self {
        let construct: Arc<ModelConstructor> = Arc::new(|payload| {
            let instance: T = serde_json::from_value(Value::Object(payload.clone()))
                .map_err(|e| e.to_string())?;
            serde_json::to_value(&instance).map_err(|e| e.to_string())
        });
        ParameterSpec {
            name: name.to_string(),
            kind: ParameterKind::Model { construct },
        }
    }

    pub fn is_structured_model(&self) -> bool {
        matches!(self.kind, ParameterKind::Model { .. })
    }

    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            ParameterKind::Scalar => "scalar",
            ParameterKind::Model { .. } => "model",
        }
    }
}

/// The handler's declared source text and where it starts, as supplied by
/// the host at registration.
#[derive(Debug, Clone)]
pub struct SourceSpan {
    pub file: &'static str,
    pub start_line: u32,
    pub text: String,
}

/// One registered route. Owned by the [`RouteTable`]; read-only to the
/// debug engine.
#[derive(Clone, Debug)]
pub struct RouteDescriptor {
    pub path: String,
    pub method: String,
    pub handler: HandlerRef,
    pub parameters: Vec<ParameterSpec>,
    pub source: Option<SourceSpan>,
}

impl RouteDescriptor {
    pub fn new(method: &str, path: &str, handler: Handler) -> Self {
        RouteDescriptor {
            path: path.to_string(),
            method: method.to_ascii_uppercase(),
            handler: HandlerRef::Concrete(handler),
            parameters: Vec::new(),
            source: None,
        }
    }

    /// Wrap the stored handler reference in a named layer.
    pub fn layer(mut self, name: &'static str) -> Self {
        self.handler = self.handler.layered(name);
        self
    }

    pub fn param(mut self, spec: ParameterSpec) -> Self {
        self.parameters.push(spec);
        self
    }

    pub fn source(mut self, file: &'static str, start_line: u32, text: &str) -> Self {
        self.source = Some(SourceSpan {
            file,
            start_line,
            text: text.to_string(),
        });
        self
    }

    pub fn is_suspending(&self) -> bool {
        self.handler.concrete().is_suspending()
    }
}

/// The host service's registered routes.
#[derive(Default)]
pub struct RouteTable {
    routes: Vec<RouteDescriptor>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(&mut self, descriptor: RouteDescriptor) -> &mut Self {
        self.routes.push(descriptor);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &RouteDescriptor> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
