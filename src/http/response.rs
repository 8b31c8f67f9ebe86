//! Response materialization.
//!
//! # Responsibilities
//! - Turn a resolved `ViewLocator` into an outbound response description
//! - Map redirects to `302 Found` with a `Location` header
//! - Map fatal resolution errors to `500`
//!
//! # Design Decisions
//! - Materializing performs no I/O; forwards are only described here and
//!   carried out by the server
//! - Prebuilt responses pass through untouched

use axum::{
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Response},
};

use crate::config::schema::ViewConfig;
use crate::view::{ResolveError, ViewLocator};

/// Header naming the forward target when a forward is rendered as a plain
/// response instead of being dispatched.
pub const X_FORWARD_PATH: HeaderName = HeaderName::from_static("x-forward-path");

/// What the serving layer should send back.
#[derive(Debug)]
pub enum OutboundResponse {
    /// 200 with an empty body.
    Empty,
    /// Fully formed upstream; sent as-is.
    Raw(Response),
    /// Dispatch internally to this view or action path.
    Forward(String),
    /// Send the client to this url.
    Redirect(String),
}

/// Forward instruction left in response extensions when an
/// [`OutboundResponse::Forward`] is converted directly into a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardTarget(pub String);

/// Converts locators into outbound responses.
#[derive(Debug, Clone)]
pub struct Materializer {
    redirect_prefix: String,
}

impl Materializer {
    pub fn new(conventions: &ViewConfig) -> Self {
        Self {
            redirect_prefix: conventions.redirect_prefix.clone(),
        }
    }

    pub fn materialize(&self, locator: ViewLocator) -> OutboundResponse {
        match locator {
            ViewLocator::EmptyOk => OutboundResponse::Empty,
            ViewLocator::RawResponse(response) => OutboundResponse::Raw(response),
            ViewLocator::Forward(path) => OutboundResponse::Forward(path),
            ViewLocator::Redirect(url) => {
                let target = url
                    .strip_prefix(self.redirect_prefix.as_str())
                    .map(str::to_string)
                    .unwrap_or(url);
                OutboundResponse::Redirect(target)
            }
        }
    }
}

impl IntoResponse for OutboundResponse {
    fn into_response(self) -> Response {
        match self {
            OutboundResponse::Empty => StatusCode::OK.into_response(),
            OutboundResponse::Raw(response) => response,
            OutboundResponse::Redirect(url) => {
                (StatusCode::FOUND, [(header::LOCATION, url)]).into_response()
            }
            OutboundResponse::Forward(path) => {
                let mut response =
                    (StatusCode::OK, [(X_FORWARD_PATH, path.clone())]).into_response();
                response.extensions_mut().insert(ForwardTarget(path));
                response
            }
        }
    }
}

impl IntoResponse for ResolveError {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn materializer() -> Materializer {
        Materializer::new(&ViewConfig::default())
    }

    #[test]
    fn test_empty_ok() {
        let response = materializer().materialize(ViewLocator::EmptyOk).into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(header::LOCATION).is_none());
    }

    #[test]
    fn test_raw_passthrough() {
        let raw = Response::builder()
            .status(StatusCode::CREATED)
            .header("x-custom", "1")
            .body(Body::empty())
            .unwrap();
        let response = materializer()
            .materialize(ViewLocator::RawResponse(raw))
            .into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()["x-custom"], "1");
    }

    #[test]
    fn test_redirect_strips_prefix() {
        let outbound = materializer().materialize(ViewLocator::Redirect(
            "redirect:https://example.com/x?redirect=true".into(),
        ));
        assert!(
            matches!(outbound, OutboundResponse::Redirect(ref url) if url == "https://example.com/x?redirect=true")
        );

        let response = outbound.into_response();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers()[header::LOCATION],
            "https://example.com/x?redirect=true"
        );
    }

    #[test]
    fn test_forward_carries_target() {
        let response = materializer()
            .materialize(ViewLocator::Forward("/WEB-INF/view/user/detail.jsp".into()))
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[X_FORWARD_PATH], "/WEB-INF/view/user/detail.jsp");
        assert_eq!(
            response.extensions().get::<ForwardTarget>(),
            Some(&ForwardTarget("/WEB-INF/view/user/detail.jsp".into()))
        );
    }

    #[test]
    fn test_resolve_error_is_server_error() {
        let response = ResolveError::UnsupportedResultType { kind: "number" }.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
