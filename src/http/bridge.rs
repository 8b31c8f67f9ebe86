//! The result-to-response pipeline for one action invocation.
//!
//! ```text
//! action result
//!     → override slot (forced response wins, resolution skipped)
//!     → descriptor conversion (unsupported kinds fail here)
//!     → PathResolver::resolve
//!     → Materializer::materialize
//! ```

use crate::config::schema::ViewConfig;
use crate::http::context::RequestContext;
use crate::http::response::{Materializer, OutboundResponse};
use crate::observability::metrics;
use crate::view::{HandlerIdentity, IntoResultDescriptor, PathResolver, ResolveError};

#[derive(Debug, Clone)]
pub struct ViewBridge {
    resolver: PathResolver,
    materializer: Materializer,
}

impl ViewBridge {
    pub fn new(resolver: PathResolver) -> Self {
        let materializer = Materializer::new(resolver.conventions());
        Self {
            resolver,
            materializer,
        }
    }

    pub fn conventions(&self) -> &ViewConfig {
        self.resolver.conventions()
    }

    /// Turn an action's result into the outbound response.
    pub fn complete<R: IntoResultDescriptor>(
        &self,
        ctx: &RequestContext,
        handler: &HandlerIdentity,
        result: R,
    ) -> Result<OutboundResponse, ResolveError> {
        if let Some(forced) = ctx.take_forced() {
            tracing::debug!(
                request_id = %ctx.request_id(),
                handler = %handler,
                status = %forced.status(),
                "Using forced response"
            );
            metrics::record_forced_response();
            return Ok(OutboundResponse::Raw(forced));
        }

        let locator = result
            .into_result_descriptor()
            .and_then(|descriptor| self.resolver.resolve(descriptor, handler))
            .inspect_err(|e| metrics::record_resolution_error(e.label()))?;

        metrics::record_resolution(locator.kind());
        Ok(self.materializer.materialize(locator))
    }
}
