//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Store compiled routes
//! - Look up matching route for request
//! - Return matched route or explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) pattern scan (acceptable for typical route counts)
//! - Explicit NoMatch rather than silent default
//! - Routes without a local handler still count as existing

use std::collections::BTreeMap;

use axum::http::Method;

use crate::config::schema::RouteConfig;
use crate::routing::{PatternError, RouteLookupError, RouteOracle, RoutePattern};

#[derive(Debug, Clone)]
struct RouteEntry<H> {
    pattern: RoutePattern,
    /// Empty means any method.
    methods: Vec<Method>,
    handler: Option<H>,
}

impl<H> RouteEntry<H> {
    fn allows(&self, method: &Method) -> bool {
        self.methods.is_empty() || self.methods.contains(method)
    }
}

/// Outcome of a route lookup.
#[derive(Debug)]
pub enum RouteMatch<'a, H> {
    Found {
        pattern: &'a RoutePattern,
        /// `None` for routes served outside this table's owner.
        handler: Option<&'a H>,
        params: BTreeMap<String, String>,
    },
    MethodNotAllowed,
    NotFound,
}

/// Compiled, ordered set of routes.
#[derive(Debug, Clone)]
pub struct RouteTable<H> {
    entries: Vec<RouteEntry<H>>,
}

impl<H> Default for RouteTable<H> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<H> RouteTable<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a route. Earlier routes take precedence.
    pub fn insert(
        &mut self,
        pattern: &str,
        methods: Vec<Method>,
        handler: Option<H>,
    ) -> Result<(), PatternError> {
        let pattern = RoutePattern::parse(pattern)?;
        self.entries.push(RouteEntry {
            pattern,
            methods,
            handler,
        });
        Ok(())
    }

    /// Add handler-less routes declared in configuration.
    ///
    /// Methods are expected to be pre-validated; unparsable ones are skipped.
    pub fn extend_from_config(&mut self, routes: &[RouteConfig]) -> Result<(), PatternError> {
        for route in routes {
            let methods = route
                .methods
                .iter()
                .filter_map(|m| Method::from_bytes(m.as_bytes()).ok())
                .collect();
            self.insert(&route.path, methods, None)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find the route serving `method` on `path`.
    pub fn lookup(&self, path: &str, method: &Method) -> RouteMatch<'_, H> {
        let mut path_matched = false;

        for entry in &self.entries {
            let Some(params) = entry.pattern.matches(path) else {
                continue;
            };
            if entry.allows(method) {
                return RouteMatch::Found {
                    pattern: &entry.pattern,
                    handler: entry.handler.as_ref(),
                    params,
                };
            }
            path_matched = true;
        }

        if path_matched {
            RouteMatch::MethodNotAllowed
        } else {
            RouteMatch::NotFound
        }
    }
}

impl<H: Send + Sync> RouteOracle for RouteTable<H> {
    fn route_exists(&self, path: &str, method: &Method) -> Result<bool, RouteLookupError> {
        Ok(matches!(self.lookup(path, method), RouteMatch::Found { .. }))
    }
}
