//! Serde wire contract for debug requests and replies.
//!
//! Framework-agnostic: a host mounts these however it serves HTTP; the CLI
//! uses them directly. Reply enums are untagged so the serialized shapes are
//! plain `{source, start_line}` / `{result, trace, ...}` objects on success
//! and `{error, details?}` objects on failure.

use crate::runtime::result::{DebugOutcome, SourceView};
use crate::tracer::LineEvent;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

fn default_method() -> String {
    "GET".to_string()
}

/// Body of a source-retrieval request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRequest {
    pub path: String,
    #[serde(default = "default_method")]
    pub method: String,
}

/// Body of a debug-invocation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebugRequest {
    pub path: String,
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default)]
    pub body: Map<String, Value>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceReply {
    Source { source: String, start_line: u32 },
    Error { error: String },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DebugReply {
    Success {
        result: Value,
        trace: Vec<LineEvent>,
        source: String,
        start_line: u32,
    },
    Error {
        error: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        details: Option<String>,
    },
}

/// Summary of one registered route, for endpoint listings.
#[derive(Debug, Serialize, Deserialize)]
pub struct EndpointInfo {
    pub method: String,
    pub path: String,
    pub suspending: bool,
    pub parameters: Vec<ParameterInfo>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ParameterInfo {
    pub name: String,
    pub kind: String,
}

impl From<DebugOutcome> for DebugReply {
    fn from(outcome: DebugOutcome) -> Self {
        match outcome {
            DebugOutcome::Success {
                value,
                trace,
                source,
                start_line,
            } => DebugReply::Success {
                result: value,
                trace,
                source,
                start_line,
            },
            DebugOutcome::Failure(failure) => DebugReply::Error {
                error: failure.message,
                details: failure.detail,
            },
        }
    }
}

/// Shape a source lookup into its wire reply.
pub fn source_reply(result: crate::Result<SourceView>) -> SourceReply {
    match result {
        Ok(view) => SourceReply::Source {
            source: view.source,
            start_line: view.start_line,
        },
        Err(err) => SourceReply::Error {
            error: err.to_string(),
        },
    }
}
