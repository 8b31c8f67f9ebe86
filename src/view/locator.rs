//! Resolved view locators.

use axum::response::Response;

/// The single outcome of resolving one [`ResultDescriptor`](crate::view::ResultDescriptor).
#[derive(Debug)]
pub enum ViewLocator {
    /// Client redirect; the url keeps its `redirect:` prefix.
    Redirect(String),
    /// Server-side dispatch to a view resource or action path.
    Forward(String),
    /// Response built by the action, passed through untouched.
    RawResponse(Response),
    /// Bare 200 with no body.
    EmptyOk,
}

impl ViewLocator {
    /// Short label used for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ViewLocator::Redirect(_) => "redirect",
            ViewLocator::Forward(_) => "forward",
            ViewLocator::RawResponse(_) => "raw",
            ViewLocator::EmptyOk => "empty",
        }
    }

    /// The forward path, if this is a forward.
    pub fn forward_path(&self) -> Option<&str> {
        match self {
            ViewLocator::Forward(path) => Some(path),
            _ => None,
        }
    }

    /// The redirect url, if this is a redirect.
    pub fn redirect_url(&self) -> Option<&str> {
        match self {
            ViewLocator::Redirect(url) => Some(url),
            _ => None,
        }
    }
}
