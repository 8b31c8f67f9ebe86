//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → context.rs (request ID + override slot per request)
//!     → routing table → action.rs (legacy action runs)
//!     → bridge.rs (override slot, then view resolution)
//!     → response.rs (materialize outbound response)
//!     → server.rs forwards: render.rs for views, re-dispatch for actions
//!     → Send to client
//! ```

pub mod action;
pub mod bridge;
pub mod context;
pub mod render;
pub mod response;
pub mod server;

pub use action::{Action, ActionRegistry, FnAction, PathParams};
pub use bridge::ViewBridge;
pub use context::{OverrideSlot, RequestContext, X_REQUEST_ID};
pub use render::{FileViewRenderer, ViewHeaderRenderer, ViewRenderer, X_VIEW_PATH};
pub use response::{Materializer, OutboundResponse};
pub use server::{HttpServer, ServerError};
