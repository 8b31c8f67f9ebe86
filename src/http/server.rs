//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the catch-all action dispatcher
//! - Wire up middleware (tracing, timeout, request context)
//! - Bind server to listener
//! - Dispatch requests through the route table to legacy actions
//! - Carry out forwards (view render or in-process action re-dispatch)
//! - Swap in new routes and conventions on config reload

use std::io;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request, StatusCode, Uri},
    middleware,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use futures_util::future::{BoxFuture, FutureExt};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::loader::join_errors;
use crate::config::validation::{validate_config, ValidationError};
use crate::config::BridgeConfig;
use crate::http::action::{Action, ActionRegistry, PathParams};
use crate::http::bridge::ViewBridge;
use crate::http::context::{request_context_middleware, RequestContext};
use crate::http::render::{renderer_from_config, ViewRenderer};
use crate::http::response::OutboundResponse;
use crate::observability::metrics;
use crate::routing::{PatternError, RouteMatch, RouteTable};
use crate::view::PathResolver;

/// Errors building the server from configuration.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid route: {0}")]
    Route(#[from] PatternError),

    #[error("invalid config: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

/// Everything derived from configuration; replaced wholesale on reload.
pub struct BridgeState {
    pub routes: Arc<RouteTable<Arc<dyn Action>>>,
    pub bridge: ViewBridge,
    pub renderer: Arc<dyn ViewRenderer>,
    pub max_forward_depth: u32,
}

impl BridgeState {
    /// Validate `config` and compile it. A `fixed_renderer` is kept across
    /// reloads; otherwise the renderer follows `config.forward`.
    pub fn build(
        config: &BridgeConfig,
        registry: &ActionRegistry,
        fixed_renderer: Option<&Arc<dyn ViewRenderer>>,
    ) -> Result<Self, ServerError> {
        validate_config(config).map_err(ServerError::Validation)?;

        let routes = Arc::new(registry.route_table(&config.routes)?);
        let resolver = PathResolver::new(config.view.clone(), routes.clone());
        let renderer = match fixed_renderer {
            Some(renderer) => renderer.clone(),
            None => renderer_from_config(&config.forward, &config.view),
        };
        Ok(Self {
            routes,
            bridge: ViewBridge::new(resolver),
            renderer,
            max_forward_depth: config.forward.max_depth,
        })
    }
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub inner: Arc<ArcSwap<BridgeState>>,
    pub registry: Arc<ActionRegistry>,
    pub fixed_renderer: Option<Arc<dyn ViewRenderer>>,
}

/// HTTP server for the view bridge.
pub struct HttpServer {
    router: Router,
    config: BridgeConfig,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server serving `registry` with the renderer named in `config`.
    pub fn new(config: BridgeConfig, registry: ActionRegistry) -> Result<Self, ServerError> {
        Self::build(config, registry, None)
    }

    /// Create a new HTTP server with an explicit view renderer, kept across reloads.
    pub fn with_renderer(
        config: BridgeConfig,
        registry: ActionRegistry,
        renderer: Arc<dyn ViewRenderer>,
    ) -> Result<Self, ServerError> {
        Self::build(config, registry, Some(renderer))
    }

    fn build(
        config: BridgeConfig,
        registry: ActionRegistry,
        fixed_renderer: Option<Arc<dyn ViewRenderer>>,
    ) -> Result<Self, ServerError> {
        let bridge_state = BridgeState::build(&config, &registry, fixed_renderer.as_ref())?;
        tracing::info!(
            routes = bridge_state.routes.len(),
            view_root = %config.view.view_root,
            "Route table compiled"
        );

        let state = AppState {
            inner: Arc::new(ArcSwap::from_pointee(bridge_state)),
            registry: Arc::new(registry),
            fixed_renderer,
        };

        let router = Self::build_router(&config, state.clone());
        Ok(Self {
            router,
            config,
            state,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &BridgeConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(dispatch_handler))
            .route("/", any(dispatch_handler))
            .with_state(state)
            .layer(middleware::from_fn(request_context_middleware))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http())
    }

    /// The fully layered router, for serving or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Rebuild routes and conventions from a new configuration.
    ///
    /// On failure the current state is kept.
    pub fn reload(&self, config: &BridgeConfig) -> Result<(), ServerError> {
        apply_config(&self.state, config)
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires. Configurations received on `config_updates` are
    /// applied live.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<BridgeConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let reload_state = self.state.clone();
        tokio::spawn(async move {
            while let Some(config) = config_updates.recv().await {
                if let Err(e) = apply_config(&reload_state, &config) {
                    tracing::error!(error = %e, "Rejected reloaded config, keeping current routes");
                }
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

fn apply_config(state: &AppState, config: &BridgeConfig) -> Result<(), ServerError> {
    let next = BridgeState::build(config, &state.registry, state.fixed_renderer.as_ref())?;
    tracing::info!(routes = next.routes.len(), "Applied reloaded config");
    state.inner.store(Arc::new(next));
    Ok(())
}

/// Catch-all handler: every request goes through the route table.
async fn dispatch_handler(
    State(state): State<AppState>,
    ctx: RequestContext,
    request: Request<Body>,
) -> Response {
    let method = request.method().clone();
    let response = dispatch(state, ctx, request, 0).await;
    metrics::record_request(method.as_str(), response.status().as_u16());
    response
}

/// Run the action for `request` and carry its result through the bridge.
///
/// `depth` counts action-to-action forwards taken so far in this request.
fn dispatch(
    state: AppState,
    ctx: RequestContext,
    mut request: Request<Body>,
    depth: u32,
) -> BoxFuture<'static, Response> {
    async move {
        let inner = state.inner.load_full();
        let path = request.uri().path().to_string();
        let method = request.method().clone();

        let (action, params) = match inner.routes.lookup(&path, &method) {
            RouteMatch::Found {
                handler: Some(action),
                params,
                ..
            } => (action.clone(), params),
            RouteMatch::Found { handler: None, .. } | RouteMatch::NotFound => {
                tracing::debug!(request_id = %ctx.request_id(), path = %path, "No action for path");
                return (StatusCode::NOT_FOUND, "No matching route found").into_response();
            }
            RouteMatch::MethodNotAllowed => {
                return (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed").into_response();
            }
        };

        tracing::debug!(
            request_id = %ctx.request_id(),
            handler = %action.identity(),
            method = %method,
            path = %path,
            depth,
            "Dispatching action"
        );

        request.extensions_mut().insert(PathParams(params));
        let query = request.uri().query().map(str::to_string);
        let headers = request.headers().clone();
        let result = action.call(ctx.clone(), request).await;

        let outbound = match inner.bridge.complete(&ctx, action.identity(), result) {
            Ok(outbound) => outbound,
            Err(e) => {
                tracing::error!(
                    request_id = %ctx.request_id(),
                    handler = %action.identity(),
                    error = %e,
                    "View resolution failed"
                );
                return e.into_response();
            }
        };

        match outbound {
            OutboundResponse::Forward(target) => {
                let carried = Carried { query, headers };
                forward(ctx, &inner, state, target, carried, depth).await
            }
            other => other.into_response(),
        }
    }
    .boxed()
}

/// Parts of the original request that survive an action-to-action forward.
struct Carried {
    query: Option<String>,
    headers: HeaderMap,
}

impl Carried {
    /// The forward target, with the original query when it has none of its own.
    fn uri_for(&self, target: &str) -> String {
        match &self.query {
            Some(query) if !target.contains('?') => format!("{target}?{query}"),
            _ => target.to_string(),
        }
    }

    /// Original headers minus body framing; forwarded requests have no body.
    fn into_headers(mut self) -> HeaderMap {
        self.headers.remove(header::CONTENT_LENGTH);
        self.headers.remove(header::TRANSFER_ENCODING);
        self.headers
    }
}

/// Serve a forward: views go to the renderer, action paths are dispatched
/// again in-process with the same context.
async fn forward(
    ctx: RequestContext,
    inner: &BridgeState,
    state: AppState,
    target: String,
    carried: Carried,
    depth: u32,
) -> Response {
    if is_view_target(&target, &inner.bridge.conventions().view_root) {
        return inner.renderer.render(&target, &ctx).await;
    }

    if depth >= inner.max_forward_depth {
        tracing::error!(
            request_id = %ctx.request_id(),
            forward_target = %target,
            max_depth = inner.max_forward_depth,
            "Forward depth exceeded"
        );
        return (StatusCode::INTERNAL_SERVER_ERROR, "Forward depth exceeded").into_response();
    }

    let uri: Uri = match carried.uri_for(&target).parse() {
        Ok(uri) => uri,
        Err(e) => {
            tracing::error!(request_id = %ctx.request_id(), forward_target = %target, error = %e, "Invalid forward target");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Invalid forward target").into_response();
        }
    };

    let mut request = Request::new(Body::empty());
    *request.uri_mut() = uri;
    *request.headers_mut() = carried.into_headers();
    dispatch(state, ctx, request, depth + 1).await
}

/// Absolute urls and anything under the view root are rendered, not dispatched.
fn is_view_target(target: &str, view_root: &str) -> bool {
    if !target.starts_with('/') {
        return true;
    }
    match target.strip_prefix(view_root) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn carried(query: Option<&str>) -> Carried {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_LENGTH, "5".parse().unwrap());
        headers.insert(header::TRANSFER_ENCODING, "chunked".parse().unwrap());
        headers.insert(header::ACCEPT, "text/html".parse().unwrap());
        Carried {
            query: query.map(str::to_string),
            headers,
        }
    }

    #[test]
    fn test_forward_keeps_original_query() {
        assert_eq!(carried(Some("id=7")).uri_for("/target"), "/target?id=7");
        assert_eq!(carried(Some("id=7")).uri_for("/target?q=1"), "/target?q=1");
        assert_eq!(carried(None).uri_for("/target"), "/target");
    }

    #[test]
    fn test_forward_drops_body_framing_headers() {
        let headers = carried(None).into_headers();
        assert!(headers.get(header::CONTENT_LENGTH).is_none());
        assert!(headers.get(header::TRANSFER_ENCODING).is_none());
        assert_eq!(headers[header::ACCEPT], "text/html");
    }

    #[test]
    fn test_view_targets() {
        assert!(is_view_target("/WEB-INF/view/user/list.jsp", "/WEB-INF/view"));
        assert!(is_view_target("https://example.com/x", "/WEB-INF/view"));
        assert!(!is_view_target("/WEB-INF/viewer/x", "/WEB-INF/view"));
        assert!(!is_view_target("/user/index", "/WEB-INF/view"));
    }
}
