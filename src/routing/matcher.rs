//! Route pattern matching.
//!
//! # Responsibilities
//! - Parse path patterns (`/users/{id}`, `/static/{*rest}`)
//! - Match request paths segment by segment
//! - Capture named parameters
//!
//! # Design Decisions
//! - Same placeholder syntax as axum so patterns read the same everywhere
//! - Path matching is case-sensitive
//! - A trailing slash is significant (`/foo` and `/foo/` differ)
//! - No regex to guarantee O(n) matching

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

/// Reasons a route pattern is rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PatternError {
    #[error("pattern must start with '/'")]
    NotRooted,

    #[error("empty parameter name in segment `{0}`")]
    EmptyParam(String),

    #[error("wildcard `{0}` must be the last segment")]
    WildcardNotLast(String),

    #[error("malformed placeholder in segment `{0}`")]
    Malformed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
    Wildcard(String),
}

/// A compiled route path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    raw: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    /// Compile a pattern.
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        let rest = pattern.strip_prefix('/').ok_or(PatternError::NotRooted)?;

        let raw_segments: Vec<&str> = rest.split('/').collect();
        let last = raw_segments.len() - 1;
        let mut segments = Vec::with_capacity(raw_segments.len());

        for (i, segment) in raw_segments.iter().enumerate() {
            let parsed = match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Some(inner) => {
                    if let Some(name) = inner.strip_prefix('*') {
                        if i != last {
                            return Err(PatternError::WildcardNotLast(segment.to_string()));
                        }
                        if name.is_empty() {
                            return Err(PatternError::EmptyParam(segment.to_string()));
                        }
                        Segment::Wildcard(name.to_string())
                    } else if inner.is_empty() {
                        return Err(PatternError::EmptyParam(segment.to_string()));
                    } else {
                        Segment::Param(inner.to_string())
                    }
                }
                None if segment.contains('{') || segment.contains('}') => {
                    return Err(PatternError::Malformed(segment.to_string()));
                }
                None => Segment::Literal(segment.to_string()),
            };
            segments.push(parsed);
        }

        Ok(Self {
            raw: pattern.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Match a request path, returning captured parameters on success.
    pub fn matches(&self, path: &str) -> Option<BTreeMap<String, String>> {
        let rest = path.strip_prefix('/')?;
        let mut parts = rest.split('/');
        let mut params = BTreeMap::new();

        for segment in &self.segments {
            match segment {
                Segment::Wildcard(name) => {
                    let remainder: Vec<&str> = parts.by_ref().collect();
                    let remainder = remainder.join("/");
                    if remainder.is_empty() {
                        return None;
                    }
                    params.insert(name.clone(), remainder);
                    return Some(params);
                }
                Segment::Literal(expected) => {
                    if parts.next()? != expected.as_str() {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    let value = parts.next()?;
                    if value.is_empty() {
                        return None;
                    }
                    params.insert(name.clone(), value.to_string());
                }
            }
        }

        match parts.next() {
            Some(_) => None,
            None => Some(params),
        }
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
