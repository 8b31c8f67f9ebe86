//! Per-request execution context.
//!
//! # Responsibilities
//! - Generate a request ID for every request
//! - Own the request's override slot ("forced next response")
//! - Expose both to actions through request extensions
//!
//! # Design Decisions
//! - One context per request, created by middleware; never a global
//! - The slot is cleared when the request completes, whatever the outcome
//! - Cloning a context shares it (forwards within a request see the same slot)

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::{
    body::Body,
    extract::FromRequestParts,
    http::{header::HeaderName, request::Parts, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;
use uuid::Uuid;

/// Header carrying the request ID back to the client.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Holds at most one pending response that replaces whatever the action
/// returns.
#[derive(Debug, Default)]
pub struct OverrideSlot {
    pending: Mutex<Option<Response>>,
}

impl OverrideSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a forced response, replacing any earlier one.
    pub fn set_forced(&self, response: Response) {
        if self.lock().replace(response).is_some() {
            tracing::debug!("Replaced pending forced response");
        }
    }

    /// Take the forced response, leaving the slot empty.
    pub fn take_forced(&self) -> Option<Response> {
        self.lock().take()
    }

    pub fn is_set(&self) -> bool {
        self.lock().is_some()
    }

    pub fn clear(&self) {
        self.lock().take();
    }

    fn lock(&self) -> MutexGuard<'_, Option<Response>> {
        // A panic while holding the lock cannot leave the Option half-written.
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug)]
struct ContextInner {
    request_id: Uuid,
    slot: OverrideSlot,
}

/// Request-scoped state shared by the middleware, the action, and the bridge.
#[derive(Debug, Clone)]
pub struct RequestContext {
    inner: Arc<ContextInner>,
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestContext {
    pub fn new() -> Self {
        Self::with_request_id(Uuid::new_v4())
    }

    pub fn with_request_id(request_id: Uuid) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                request_id,
                slot: OverrideSlot::new(),
            }),
        }
    }

    pub fn request_id(&self) -> Uuid {
        self.inner.request_id
    }

    pub fn slot(&self) -> &OverrideSlot {
        &self.inner.slot
    }

    /// Force the response for this request, bypassing view resolution.
    pub fn set_forced(&self, response: Response) {
        self.inner.slot.set_forced(response);
    }

    pub fn take_forced(&self) -> Option<Response> {
        self.inner.slot.take_forced()
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .ok_or((StatusCode::INTERNAL_SERVER_ERROR, "Request context missing"))
    }
}

/// Attach a fresh [`RequestContext`] to the request and tag the response
/// with its request ID.
pub async fn request_context_middleware(mut req: Request<Body>, next: Next) -> Response {
    let ctx = RequestContext::new();
    req.extensions_mut().insert(ctx.clone());

    let span = tracing::info_span!("request", request_id = %ctx.request_id());
    let mut response = next.run(req).instrument(span).await;

    if ctx.slot().is_set() {
        tracing::debug!(request_id = %ctx.request_id(), "Discarding unused forced response");
    }
    ctx.slot().clear();

    if let Ok(value) = HeaderValue::from_str(&ctx.request_id().to_string()) {
        response.headers_mut().insert(X_REQUEST_ID, value);
    }
    response
}
