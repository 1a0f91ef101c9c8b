//! Route lookup and handler unwrapping.
//!
//! Resolution matches a requested `(path, method)` pair against the route
//! table. Literal path segments compare exactly; `{name}` segments capture
//! the corresponding request segment as a path parameter, parsed as a JSON
//! scalar when possible so `"1"` binds as the number `1`. A capture never
//! matches an empty segment, so `/items/` and `/items/{item_id}` stay
//! distinct routes. When several routes match, the most specific one (the
//! fewest captures) wins regardless of registration order. Passing a
//! route's pattern itself as the path matches trivially.

use crate::routing::{Handler, RouteDescriptor, RouteTable};
use crate::{DebuggerError, Result};
use serde_json::{Map, Value};
use tracing::debug;

/// A successful lookup: the descriptor, its innermost concrete callable,
/// and any path parameters captured from the requested path.
#[derive(Debug)]
pub struct Resolved<'a> {
    pub route: &'a RouteDescriptor,
    pub handler: &'a Handler,
    pub path_params: Map<String, Value>,
}

/// Find the route matching `path` and `method`.
///
/// `NotFound` is signalled as [`DebuggerError::EndpointNotFound`], distinct
/// from every internal error.
pub fn resolve<'a>(table: &'a RouteTable, path: &str, method: &str) -> Result<Resolved<'a>> {
    let method = method.to_ascii_uppercase();
    let mut best: Option<(&'a RouteDescriptor, Map<String, Value>)> = None;
    for route in table.iter() {
        if route.method != method {
            continue;
        }
        if let Some(path_params) = match_pattern(&route.path, path) {
            let more_specific = match &best {
                Some((_, held)) => path_params.len() < held.len(),
                None => true,
            };
            if more_specific {
                best = Some((route, path_params));
            }
        }
    }
    match best {
        Some((route, path_params)) => {
            for layer in route.handler.layers() {
                debug!(layer, "unwrapping handler layer");
            }
            Ok(Resolved {
                route,
                handler: route.handler.concrete(),
                path_params,
            })
        }
        None => Err(DebuggerError::EndpointNotFound {
            path: path.to_string(),
            method,
        }
        .into()),
    }
}

fn match_pattern(pattern: &str, path: &str) -> Option<Map<String, Value>> {
    if pattern == path {
        return Some(Map::new());
    }
    let pattern_segments: Vec<&str> = pattern.split('/').collect();
    let path_segments: Vec<&str> = path.split('/').collect();
    if pattern_segments.len() != path_segments.len() {
        return None;
    }
    let mut params = Map::new();
    for (expected, actual) in pattern_segments.iter().zip(&path_segments) {
        match expected.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            Some(name) => {
                if actual.is_empty() {
                    return None;
                }
                params.insert(name.to_string(), parse_segment(actual));
            }
            None if expected == actual => {}
            None => return None,
        }
    }
    Some(params)
}

/// Captured segments that read as JSON scalars are kept typed; everything
/// else stays a string.
fn parse_segment(segment: &str) -> Value {
    match serde_json::from_str::<Value>(segment) {
        Ok(value) if !value.is_object() && !value.is_array() => value,
        _ => Value::String(segment.to_string()),
    }
}
