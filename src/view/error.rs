//! Resolution error taxonomy.

use thiserror::Error;

/// Fatal errors raised while turning an action result into a view.
///
/// These are distinct from an action legitimately returning nothing, which
/// resolves to [`ViewLocator::EmptyOk`](crate::view::ViewLocator::EmptyOk).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The action produced a value of a kind the bridge does not accept.
    #[error("unsupported action result type: {kind}")]
    UnsupportedResultType { kind: &'static str },

    /// A bare template name was returned but the handler name carries no
    /// `action` marker segment to derive a view directory from.
    #[error("handler identity `{identity}` has no `{marker}` segment to derive a view path from")]
    MalformedHandlerIdentity { identity: String, marker: String },

    /// The route oracle failed and the configured policy forbids falling back.
    #[error("route oracle unavailable while resolving `{path}`: {reason}")]
    RouteOracleUnavailable { path: String, reason: String },
}

impl ResolveError {
    /// Short label used for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            ResolveError::UnsupportedResultType { .. } => "unsupported_result_type",
            ResolveError::MalformedHandlerIdentity { .. } => "malformed_handler_identity",
            ResolveError::RouteOracleUnavailable { .. } => "route_oracle_unavailable",
        }
    }
}
