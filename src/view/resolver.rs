//! Result-to-view path resolution.
//!
//! # Rules (first match wins)
//! 1. `Empty` → `EmptyOk`
//! 2. `PrebuiltResponse` → `RawResponse`
//! 3. `PathString`:
//!    - absolute `http(s)://` url → `Redirect` if it carries the redirect
//!      marker, otherwise `Forward` to the url as-is
//!    - ends with `/indexBack` → forward to it, rooted
//!    - `/path/` → forward to the action `/path` if routable, else `/path/index`
//!    - `/path.jsp` → forward under the view root
//!    - bare name → forward under the view root plus the directory derived
//!      from the handler identity
//! 4. Forward paths ending in `/` gain the default view file.

use std::sync::Arc;

use axum::http::Method;

use crate::config::schema::{OracleFailurePolicy, ViewConfig};
use crate::observability::metrics;
use crate::routing::RouteOracle;
use crate::view::{HandlerIdentity, ResolveError, ResultDescriptor, ViewLocator};

/// Maps action results to view locators using the legacy conventions.
#[derive(Clone)]
pub struct PathResolver {
    conventions: ViewConfig,
    oracle: Arc<dyn RouteOracle>,
}

impl std::fmt::Debug for PathResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathResolver")
            .field("conventions", &self.conventions)
            .finish_non_exhaustive()
    }
}

impl PathResolver {
    pub fn new(conventions: ViewConfig, oracle: Arc<dyn RouteOracle>) -> Self {
        Self { conventions, oracle }
    }

    pub fn conventions(&self) -> &ViewConfig {
        &self.conventions
    }

    /// Resolve one action result for the given handler.
    pub fn resolve(
        &self,
        descriptor: ResultDescriptor,
        handler: &HandlerIdentity,
    ) -> Result<ViewLocator, ResolveError> {
        let text = match descriptor {
            ResultDescriptor::Empty => return Ok(ViewLocator::EmptyOk),
            ResultDescriptor::PrebuiltResponse(response) => {
                return Ok(ViewLocator::RawResponse(response))
            }
            ResultDescriptor::PathString(text) => text,
        };

        if is_absolute_url(&text) {
            let locator = if text.contains(self.conventions.redirect_marker.as_str()) {
                ViewLocator::Redirect(format!("{}{}", self.conventions.redirect_prefix, text))
            } else {
                ViewLocator::Forward(text)
            };
            tracing::debug!(handler = %handler, kind = locator.kind(), "Resolved absolute url");
            return Ok(locator);
        }

        let mut path = self.forward_path(&text, handler)?;
        if path.ends_with('/') {
            path.push_str(&self.conventions.default_view);
        }

        tracing::debug!(handler = %handler, result = %text, path = %path, "Resolved view path");
        Ok(ViewLocator::Forward(path))
    }

    fn forward_path(&self, text: &str, handler: &HandlerIdentity) -> Result<String, ResolveError> {
        let c = &self.conventions;

        if text.ends_with(c.index_back_suffix.as_str()) {
            return Ok(rooted(text));
        }

        if text.starts_with('/') && text.ends_with('/') {
            return self.action_path(&text[..text.len() - 1]);
        }

        if text.starts_with('/') && text.ends_with(c.template_extension.as_str()) {
            return Ok(format!("{}{}", c.view_root, text));
        }

        let subpath = handler
            .view_subpath(&c.action_marker, c.handler_suffix_len)
            .ok_or_else(|| ResolveError::MalformedHandlerIdentity {
                identity: handler.to_string(),
                marker: c.action_marker.clone(),
            })?;
        let base = format!("{}{}", c.view_root, subpath);
        Ok(join_view(&base, text))
    }

    /// Forward to another action: the path itself when routable, otherwise
    /// its default action method.
    fn action_path(&self, stripped: &str) -> Result<String, ResolveError> {
        let path = rooted(stripped);
        let routable = match self.oracle.route_exists(&path, &Method::GET) {
            Ok(exists) => exists,
            Err(e) => match self.conventions.on_oracle_failure {
                OracleFailurePolicy::Fallback => {
                    tracing::warn!(path = %path, error = %e, "Route oracle failed, assuming no route");
                    metrics::record_oracle_failure();
                    false
                }
                OracleFailurePolicy::Fail => {
                    return Err(ResolveError::RouteOracleUnavailable {
                        path,
                        reason: e.to_string(),
                    })
                }
            },
        };

        if routable {
            Ok(path)
        } else if path.ends_with('/') {
            Ok(format!("{}{}", path, self.conventions.default_action))
        } else {
            Ok(format!("{}/{}", path, self.conventions.default_action))
        }
    }
}

fn is_absolute_url(text: &str) -> bool {
    starts_with_ignore_case(text, "http://") || starts_with_ignore_case(text, "https://")
}

fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.get(..prefix.len())
        .map(|head| head.eq_ignore_ascii_case(prefix))
        .unwrap_or(false)
}

/// Join a view directory and a result with exactly one `/` between them.
fn join_view(base: &str, text: &str) -> String {
    match (base.ends_with('/'), text.starts_with('/')) {
        (true, true) => format!("{base}{}", &text[1..]),
        (false, false) => format!("{base}/{text}"),
        _ => format!("{base}{text}"),
    }
}

fn rooted(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::RouteLookupError;
    use axum::body::Body;
    use axum::http::StatusCode;
    use axum::response::Response;
    use std::collections::HashSet;

    /// Oracle answering from a fixed set of GET paths.
    struct FixedOracle(HashSet<&'static str>);

    impl RouteOracle for FixedOracle {
        fn route_exists(&self, path: &str, method: &Method) -> Result<bool, RouteLookupError> {
            Ok(method == Method::GET && self.0.contains(path))
        }
    }

    struct BrokenOracle;

    impl RouteOracle for BrokenOracle {
        fn route_exists(&self, _path: &str, _method: &Method) -> Result<bool, RouteLookupError> {
            Err(RouteLookupError::Unavailable("routing table not loaded".into()))
        }
    }

    fn resolver_with(routes: &[&'static str]) -> PathResolver {
        PathResolver::new(
            ViewConfig::default(),
            Arc::new(FixedOracle(routes.iter().copied().collect())),
        )
    }

    fn user_action() -> HandlerIdentity {
        HandlerIdentity::new("com.example.action.userAction")
    }

    fn forward(resolver: &PathResolver, text: &str) -> String {
        let locator = resolver
            .resolve(ResultDescriptor::PathString(text.into()), &user_action())
            .unwrap();
        locator.forward_path().expect("expected a forward").to_string()
    }

    #[test]
    fn test_empty_is_empty_ok() {
        let resolver = resolver_with(&[]);
        for handler in ["com.example.action.userAction", "no.marker.HereAction", ""] {
            let locator = resolver
                .resolve(ResultDescriptor::Empty, &HandlerIdentity::new(handler))
                .unwrap();
            assert!(matches!(locator, ViewLocator::EmptyOk));
        }
    }

    #[test]
    fn test_prebuilt_response_passes_through() {
        let resolver = resolver_with(&[]);
        let response = Response::builder()
            .status(StatusCode::ACCEPTED)
            .body(Body::empty())
            .unwrap();
        let locator = resolver
            .resolve(ResultDescriptor::PrebuiltResponse(response), &user_action())
            .unwrap();
        match locator {
            ViewLocator::RawResponse(r) => assert_eq!(r.status(), StatusCode::ACCEPTED),
            other => panic!("unexpected locator {other:?}"),
        }
    }

    #[test]
    fn test_absolute_url_with_marker_redirects() {
        let resolver = resolver_with(&[]);
        let locator = resolver
            .resolve(
                ResultDescriptor::PathString("https://example.com/x?redirect=true".into()),
                &user_action(),
            )
            .unwrap();
        assert_eq!(
            locator.redirect_url(),
            Some("redirect:https://example.com/x?redirect=true")
        );
    }

    #[test]
    fn test_absolute_url_without_marker_forwards() {
        let resolver = resolver_with(&[]);
        assert_eq!(forward(&resolver, "https://example.com/x"), "https://example.com/x");
        // Scheme match ignores case and skips the trailing-slash default.
        assert_eq!(forward(&resolver, "HTTP://example.com/"), "HTTP://example.com/");
    }

    #[test]
    fn test_index_back() {
        let resolver = resolver_with(&[]);
        assert_eq!(forward(&resolver, "/foo/indexBack"), "/foo/indexBack");
        assert_eq!(forward(&resolver, "foo/indexBack"), "/foo/indexBack");
    }

    #[test]
    fn test_action_path_routable() {
        let resolver = resolver_with(&["/foo"]);
        assert_eq!(forward(&resolver, "/foo/"), "/foo");
    }

    #[test]
    fn test_action_path_falls_back_to_index() {
        let resolver = resolver_with(&[]);
        assert_eq!(forward(&resolver, "/foo/"), "/foo/index");
        assert_eq!(forward(&resolver, "/"), "/index");
    }

    #[test]
    fn test_action_path_oracle_failure_falls_back() {
        let resolver = PathResolver::new(ViewConfig::default(), Arc::new(BrokenOracle));
        assert_eq!(forward(&resolver, "/foo/"), "/foo/index");
    }

    #[test]
    fn test_action_path_oracle_failure_policy_fail() {
        let conventions = ViewConfig {
            on_oracle_failure: OracleFailurePolicy::Fail,
            ..ViewConfig::default()
        };
        let resolver = PathResolver::new(conventions, Arc::new(BrokenOracle));
        let err = resolver
            .resolve(ResultDescriptor::PathString("/foo/".into()), &user_action())
            .unwrap_err();
        assert!(matches!(err, ResolveError::RouteOracleUnavailable { ref path, .. } if path == "/foo"));
    }

    #[test]
    fn test_explicit_jsp() {
        let resolver = resolver_with(&[]);
        assert_eq!(forward(&resolver, "/view/page.jsp"), "/WEB-INF/view/view/page.jsp");
    }

    #[test]
    fn test_bare_name_uses_handler_directory() {
        let resolver = resolver_with(&[]);
        assert_eq!(forward(&resolver, "detail.jsp"), "/WEB-INF/view/user/detail.jsp");
    }

    #[test]
    fn test_rooted_non_jsp_skips_separator() {
        let resolver = resolver_with(&[]);
        assert_eq!(forward(&resolver, "/detail.html"), "/WEB-INF/view/user/detail.html");
    }

    #[test]
    fn test_trailing_slash_gains_default_view() {
        let resolver = resolver_with(&[]);
        assert_eq!(forward(&resolver, ""), "/WEB-INF/view/user/index.jsp");
        assert_eq!(forward(&resolver, "list/"), "/WEB-INF/view/user/list/index.jsp");
    }

    #[test]
    fn test_double_trailing_slash_gains_default_view() {
        let resolver = resolver_with(&["/foo/"]);
        assert_eq!(forward(&resolver, "/foo//"), "/foo/index.jsp");
    }

    #[test]
    fn test_handler_directly_under_marker() {
        let resolver = resolver_with(&[]);
        let handler = HandlerIdentity::new("com.example.action.Action");
        let resolve = |text: &str| {
            resolver
                .resolve(ResultDescriptor::PathString(text.into()), &handler)
                .unwrap()
                .forward_path()
                .map(str::to_string)
        };
        assert_eq!(resolve("detail.jsp").as_deref(), Some("/WEB-INF/view/detail.jsp"));
        assert_eq!(resolve("/detail.html").as_deref(), Some("/WEB-INF/view/detail.html"));
        assert_eq!(resolve("").as_deref(), Some("/WEB-INF/view/index.jsp"));
    }

    #[test]
    fn test_missing_marker_is_fatal() {
        let resolver = resolver_with(&[]);
        let err = resolver
            .resolve(
                ResultDescriptor::PathString("detail.jsp".into()),
                &HandlerIdentity::new("com.example.web.userAction"),
            )
            .unwrap_err();
        assert!(matches!(err, ResolveError::MalformedHandlerIdentity { .. }));
    }

    #[test]
    fn test_missing_marker_irrelevant_outside_bare_names() {
        let resolver = resolver_with(&[]);
        let handler = HandlerIdentity::new("com.example.web.userAction");
        let locator = resolver
            .resolve(ResultDescriptor::PathString("/view/page.jsp".into()), &handler)
            .unwrap();
        assert_eq!(locator.forward_path(), Some("/WEB-INF/view/view/page.jsp"));
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let resolver = resolver_with(&["/foo"]);
        for text in ["/foo/", "/bar/", "detail.jsp", "/x.jsp", "https://a.b/c"] {
            assert_eq!(forward(&resolver, text), forward(&resolver, text));
        }
    }

    #[test]
    fn test_custom_conventions() {
        let conventions = ViewConfig {
            view_root: "/views".into(),
            default_view: "main.html".into(),
            default_action: "list".into(),
            ..ViewConfig::default()
        };
        let resolver = PathResolver::new(conventions, Arc::new(FixedOracle(HashSet::new())));
        assert_eq!(forward(&resolver, "/orders/"), "/orders/list");
        assert_eq!(forward(&resolver, "sub/"), "/views/user/sub/main.html");
    }
}
