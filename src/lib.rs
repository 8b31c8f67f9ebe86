//! Legacy view bridge library.
//!
//! Runs legacy MVC-style actions on axum and turns whatever they return (a
//! view name, an action path, an absolute url, a prebuilt response, or
//! nothing) into the response the legacy framework would have produced.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod view;

pub use config::schema::BridgeConfig;
pub use http::{ActionRegistry, HttpServer, RequestContext};
pub use lifecycle::Shutdown;
pub use view::{HandlerIdentity, PathResolver, ResultDescriptor, ViewLocator};
