//! Legacy action bridging.
//!
//! An action is the legacy-style handler: it receives the request, may poke
//! the request context, and returns a loosely shaped result (a path, a
//! prebuilt response, or nothing). The bridge turns that result into the
//! real response.

use std::future::Future;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request},
};
use futures_util::future::{BoxFuture, FutureExt};

use crate::config::schema::RouteConfig;
use crate::http::context::RequestContext;
use crate::routing::{PatternError, RouteTable};
use crate::view::{HandlerIdentity, IntoResultDescriptor, ResolveError, ResultDescriptor};

pub type ActionFuture = BoxFuture<'static, Result<ResultDescriptor, ResolveError>>;

/// A legacy-style request handler.
pub trait Action: Send + Sync + 'static {
    /// Qualified handler name used for view directory derivation.
    fn identity(&self) -> &HandlerIdentity;

    fn call(&self, ctx: RequestContext, request: Request<Body>) -> ActionFuture;
}

/// Adapts an async closure into an [`Action`].
pub struct FnAction<F> {
    identity: HandlerIdentity,
    handler: F,
}

impl<F> FnAction<F> {
    pub fn new(identity: impl Into<HandlerIdentity>, handler: F) -> Self {
        Self {
            identity: identity.into(),
            handler,
        }
    }
}

impl<F, Fut, R> Action for FnAction<F>
where
    F: Fn(RequestContext, Request<Body>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResultDescriptor + Send + 'static,
{
    fn identity(&self) -> &HandlerIdentity {
        &self.identity
    }

    fn call(&self, ctx: RequestContext, request: Request<Body>) -> ActionFuture {
        let fut = (self.handler)(ctx, request);
        async move { fut.await.into_result_descriptor() }.boxed()
    }
}

/// Path parameters captured by the route pattern, inserted into request
/// extensions before the action runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams(pub std::collections::BTreeMap<String, String>);

impl PathParams {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }
}

struct Registration {
    pattern: String,
    methods: Vec<Method>,
    action: Arc<dyn Action>,
}

/// Ordered list of action routes, compiled into a [`RouteTable`] by the server.
#[derive(Default)]
pub struct ActionRegistry {
    routes: Vec<Registration>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an action for the given methods (empty means any).
    pub fn route<A: Action>(mut self, pattern: &str, methods: &[Method], action: A) -> Self {
        self.routes.push(Registration {
            pattern: pattern.to_string(),
            methods: methods.to_vec(),
            action: Arc::new(action),
        });
        self
    }

    pub fn get<F, Fut, R>(self, pattern: &str, identity: impl Into<HandlerIdentity>, handler: F) -> Self
    where
        F: Fn(RequestContext, Request<Body>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResultDescriptor + Send + 'static,
    {
        self.route(pattern, &[Method::GET], FnAction::new(identity, handler))
    }

    pub fn post<F, Fut, R>(self, pattern: &str, identity: impl Into<HandlerIdentity>, handler: F) -> Self
    where
        F: Fn(RequestContext, Request<Body>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResultDescriptor + Send + 'static,
    {
        self.route(pattern, &[Method::POST], FnAction::new(identity, handler))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Compile registered actions, followed by externally served routes.
    pub fn route_table(
        &self,
        external: &[RouteConfig],
    ) -> Result<RouteTable<Arc<dyn Action>>, PatternError> {
        let mut table = RouteTable::new();
        for registration in &self.routes {
            table.insert(
                &registration.pattern,
                registration.methods.clone(),
                Some(registration.action.clone()),
            )?;
        }
        table.extend_from_config(external)?;
        Ok(table)
    }
}
