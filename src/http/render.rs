//! Forward targets that are views.
//!
//! Rendering templates is the host's job; the bridge only decides which view
//! to show. Two renderers ship with it: one that names the view in a header
//! and one that serves the view file as-is.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use axum::{
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Response},
};
use futures_util::future::{BoxFuture, FutureExt};

use crate::config::schema::{ForwardConfig, RendererKind, ViewConfig};
use crate::http::context::RequestContext;

pub const X_VIEW_PATH: HeaderName = HeaderName::from_static("x-view-path");

/// Produces the response for a forward to a view resource or external url.
pub trait ViewRenderer: Send + Sync + 'static {
    fn render(&self, view: &str, ctx: &RequestContext) -> BoxFuture<'static, Response>;
}

/// Answers `200` with the view named in `x-view-path`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ViewHeaderRenderer;

impl ViewRenderer for ViewHeaderRenderer {
    fn render(&self, view: &str, _ctx: &RequestContext) -> BoxFuture<'static, Response> {
        let response = (StatusCode::OK, [(X_VIEW_PATH, view.to_string())]).into_response();
        futures_util::future::ready(response).boxed()
    }
}

/// Serves view files from a directory standing in for the view root.
#[derive(Debug, Clone)]
pub struct FileViewRenderer {
    view_root: String,
    directory: PathBuf,
}

impl FileViewRenderer {
    pub fn new(view_root: impl Into<String>, directory: impl Into<PathBuf>) -> Self {
        Self {
            view_root: view_root.into(),
            directory: directory.into(),
        }
    }

    /// Map a view path onto the directory, refusing anything outside it.
    fn file_for(&self, view: &str) -> Option<PathBuf> {
        // Parameters carried on the view name are not part of the file name.
        let view = view.split(['?', '#']).next().unwrap_or(view);
        let relative = view.strip_prefix(self.view_root.as_str())?;
        let relative = relative.strip_prefix('/')?;
        let relative = Path::new(relative);
        if !relative.components().all(|c| matches!(c, Component::Normal(_))) {
            return None;
        }
        Some(self.directory.join(relative))
    }
}

impl ViewRenderer for FileViewRenderer {
    fn render(&self, view: &str, ctx: &RequestContext) -> BoxFuture<'static, Response> {
        let file = self.file_for(view);
        let view = view.to_string();
        let request_id = ctx.request_id();

        async move {
            let Some(file) = file else {
                tracing::warn!(request_id = %request_id, view = %view, "View outside view root");
                return (StatusCode::NOT_FOUND, "View not found").into_response();
            };

            match tokio::fs::read(&file).await {
                Ok(bytes) => (
                    StatusCode::OK,
                    [
                        (header::CONTENT_TYPE, content_type(&file).to_string()),
                        (X_VIEW_PATH, view),
                    ],
                    bytes,
                )
                    .into_response(),
                Err(e) => {
                    tracing::warn!(request_id = %request_id, file = ?file, error = %e, "View file unreadable");
                    (StatusCode::NOT_FOUND, "View not found").into_response()
                }
            }
        }
        .boxed()
    }
}

fn content_type(file: &Path) -> &'static str {
    match file.extension().and_then(|e| e.to_str()) {
        Some("jsp" | "html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css",
        Some("js") => "text/javascript",
        Some("json") => "application/json",
        Some("txt") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

/// Pick the renderer named by configuration.
pub fn renderer_from_config(forward: &ForwardConfig, view: &ViewConfig) -> Arc<dyn ViewRenderer> {
    match (forward.renderer, &forward.view_directory) {
        (RendererKind::Files, Some(directory)) => {
            Arc::new(FileViewRenderer::new(view.view_root.clone(), directory.clone()))
        }
        _ => Arc::new(ViewHeaderRenderer),
    }
}
