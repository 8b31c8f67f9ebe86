//! Shared utilities for integration tests.
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use tower::ServiceExt;

use legacy_view_bridge::http::PathParams;
use legacy_view_bridge::ActionRegistry;

pub const USER_ACTION: &str = "com.example.action.userAction";
pub const ORDER_ACTION: &str = "com.example.action.OrderAction";
pub const HOME_ACTION: &str = "com.example.action.HomeAction";

/// Actions covering every result convention.
pub fn test_registry() -> ActionRegistry {
    ActionRegistry::new()
        .get("/", HOME_ACTION, |_ctx, _req| async { "/user/" })
        .get("/user", USER_ACTION, |_ctx, _req| async { "list.jsp" })
        .get("/user/{id}", USER_ACTION, |_ctx, req| async move {
            let id = req
                .extensions()
                .get::<PathParams>()
                .and_then(|p| p.get("id"))
                .unwrap_or_default()
                .to_string();
            format!("detail.jsp?id={id}")
        })
        .get("/go/orders", HOME_ACTION, |_ctx, _req| async { "/orders/" })
        .get("/orders/index", ORDER_ACTION, |_ctx, _req| async { "summary.jsp" })
        .get("/docs", HOME_ACTION, |_ctx, _req| async {
            "https://docs.example.com/?redirect=true"
        })
        .get("/external", HOME_ACTION, |_ctx, _req| async { "https://example.com/x" })
        .get("/back", HOME_ACTION, |_ctx, _req| async { "/home/indexBack" })
        .get("/home/indexBack", HOME_ACTION, |_ctx, _req| async { "index.jsp" })
        .get("/page", HOME_ACTION, |_ctx, _req| async { "/shared/page.jsp" })
        .get("/empty", HOME_ACTION, |_ctx, _req| async {})
        .get("/export", HOME_ACTION, |_ctx, _req| async {
            (StatusCode::CREATED, "exported").into_response()
        })
        .post("/save", USER_ACTION, |ctx, _req| async move {
            ctx.set_forced(StatusCode::NO_CONTENT.into_response());
            "list.jsp"
        })
        .get("/broken", HOME_ACTION, |_ctx, _req| async { serde_json::json!(5) })
        .get("/misnamed", "com.example.web.PlainAction", |_ctx, _req| async {
            "detail.jsp"
        })
        .get("/loop", HOME_ACTION, |_ctx, _req| async { "/loop/" })
        .get("/go/echo", HOME_ACTION, |_ctx, _req| async { "/echo/" })
        .get("/echo", HOME_ACTION, |_ctx, req| async move {
            let query = req.uri().query().unwrap_or("none").to_string();
            let framed = req.headers().contains_key(header::CONTENT_LENGTH);
            format!("echo.jsp?q={query}&len={framed}")
        })
}

/// Send a request through the router in-process.
pub async fn send(router: &Router, method: Method, uri: &str) -> Response {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    router.clone().oneshot(request).await.unwrap()
}

pub async fn body_string(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn header<'a>(response: &'a Response, name: &str) -> Option<&'a str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}
