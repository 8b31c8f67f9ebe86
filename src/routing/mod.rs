//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path)
//!     → router.rs (route lookup)
//!     → matcher.rs (evaluate path pattern)
//!     → Return: matched action, MethodNotAllowed, or NotFound
//!
//! View resolution (action-path forwards):
//!     → RouteOracle::route_exists(path, GET)
//!     → answered by the same RouteTable
//!
//! Route Compilation (at startup and on reload):
//!     registered actions + RouteConfig[]
//!     → Compile patterns
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled up front, immutable at runtime
//! - No regex in hot path
//! - Deterministic: same input always matches same route
//! - First match wins (registration order)

pub mod matcher;
pub mod router;

use axum::http::Method;
use thiserror::Error;

pub use matcher::{PatternError, RoutePattern};
pub use router::{RouteMatch, RouteTable};

/// Failure of a route oracle to answer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouteLookupError {
    #[error("route table unavailable: {0}")]
    Unavailable(String),
}

/// Answers whether a path is dispatchable for a method.
///
/// Implementations must be safe for concurrent reads; view resolution
/// never mutates them.
pub trait RouteOracle: Send + Sync {
    fn route_exists(&self, path: &str, method: &Method) -> Result<bool, RouteLookupError>;
}
