//! Action result descriptors.
//!
//! Legacy actions returned a dynamically typed value: a path string, a fully
//! built response, or nothing. Here that value is a closed enum, and every
//! conversion into it happens at the boundary through [`IntoResultDescriptor`],
//! so unsupported shapes are rejected before resolution starts.

use axum::response::Response;
use serde_json::Value;

use crate::view::ResolveError;

/// What an action handed back to the bridge.
#[derive(Debug)]
pub enum ResultDescriptor {
    /// The action returned nothing (or a null path).
    Empty,
    /// The action built the response itself.
    PrebuiltResponse(Response),
    /// A view name, action path, or absolute URL to be resolved.
    PathString(String),
}

impl ResultDescriptor {
    /// Build a descriptor from an optional path; `None` maps to `Empty`.
    pub fn from_path(path: Option<String>) -> Self {
        match path {
            Some(path) => ResultDescriptor::PathString(path),
            None => ResultDescriptor::Empty,
        }
    }
}

/// Conversion of an action's return value into a [`ResultDescriptor`].
pub trait IntoResultDescriptor {
    fn into_result_descriptor(self) -> Result<ResultDescriptor, ResolveError>;
}

impl IntoResultDescriptor for ResultDescriptor {
    fn into_result_descriptor(self) -> Result<ResultDescriptor, ResolveError> {
        Ok(self)
    }
}

impl IntoResultDescriptor for () {
    fn into_result_descriptor(self) -> Result<ResultDescriptor, ResolveError> {
        Ok(ResultDescriptor::Empty)
    }
}

impl IntoResultDescriptor for String {
    fn into_result_descriptor(self) -> Result<ResultDescriptor, ResolveError> {
        Ok(ResultDescriptor::PathString(self))
    }
}

impl IntoResultDescriptor for &'static str {
    fn into_result_descriptor(self) -> Result<ResultDescriptor, ResolveError> {
        Ok(ResultDescriptor::PathString(self.to_string()))
    }
}

impl IntoResultDescriptor for Option<String> {
    fn into_result_descriptor(self) -> Result<ResultDescriptor, ResolveError> {
        Ok(ResultDescriptor::from_path(self))
    }
}

impl IntoResultDescriptor for Response {
    fn into_result_descriptor(self) -> Result<ResultDescriptor, ResolveError> {
        Ok(ResultDescriptor::PrebuiltResponse(self))
    }
}

/// Loosely typed results, e.g. from scripted or deserialized handlers.
///
/// Only `null` and strings are meaningful; anything else is rejected with
/// the JSON kind named in the error.
impl IntoResultDescriptor for Value {
    fn into_result_descriptor(self) -> Result<ResultDescriptor, ResolveError> {
        match self {
            Value::Null => Ok(ResultDescriptor::Empty),
            Value::String(path) => Ok(ResultDescriptor::PathString(path)),
            Value::Bool(_) => Err(ResolveError::UnsupportedResultType { kind: "boolean" }),
            Value::Number(_) => Err(ResolveError::UnsupportedResultType { kind: "number" }),
            Value::Array(_) => Err(ResolveError::UnsupportedResultType { kind: "array" }),
            Value::Object(_) => Err(ResolveError::UnsupportedResultType { kind: "object" }),
        }
    }
}

impl<T, E> IntoResultDescriptor for Result<T, E>
where
    T: IntoResultDescriptor,
    E: Into<ResolveError>,
{
    fn into_result_descriptor(self) -> Result<ResultDescriptor, ResolveError> {
        self.map_err(Into::into)?.into_result_descriptor()
    }
}
