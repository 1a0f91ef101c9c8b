//! Payload-to-argument binding from declared parameter signatures.
//!
//! The payload is a pre-merged map supplied by the caller; this binder does
//! not distinguish path, query, and body sources. Parameters are processed
//! in declaration order: a structured-model parameter consumes the entire
//! payload and aborts the whole binding on construction failure, a scalar
//! parameter is copied through unchanged when its name is present and
//! omitted otherwise so the handler's own default applies.

use crate::routing::{CallArgs, ParameterKind, ParameterSpec};
use crate::{DebuggerError, Result};
use serde_json::{Map, Value};
use tracing::debug;

/// Turn a raw payload into call-ready arguments.
///
/// Fails with [`DebuggerError::ValidationFailure`] naming the first
/// structured parameter whose construction rejected the payload; remaining
/// parameters are not processed and the handler is never invoked.
pub fn bind(parameters: &[ParameterSpec], payload: &Map<String, Value>) -> Result<CallArgs> {
    let mut bound = CallArgs::default();
    for spec in parameters {
        match &spec.kind {
            ParameterKind::Model { construct } => match construct(payload) {
                Ok(value) => {
                    debug!(parameter = %spec.name, "bound structured model from payload");
                    bound.insert(spec.name.clone(), value);
                }
                Err(message) => {
                    return Err(DebuggerError::ValidationFailure {
                        parameter: spec.name.clone(),
                        message,
                    }
                    .into())
                }
            },
            ParameterKind::Scalar => {
                if let Some(value) = payload.get(&spec.name) {
                    bound.insert(spec.name.clone(), value.clone());
                }
            }
        }
    }
    Ok(bound)
}
