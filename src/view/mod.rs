//! View resolution subsystem.
//!
//! # Data Flow
//! ```text
//! Action returns a value
//!     → descriptor.rs (closed ResultDescriptor: Empty / PrebuiltResponse / PathString)
//!     → [override slot checked by the http layer]
//!     → resolver.rs (naming conventions + route oracle)
//!     → locator.rs (ViewLocator: Redirect / Forward / RawResponse / EmptyOk)
//!     → http::response (materialize into an outbound response)
//! ```
//!
//! # Design Decisions
//! - Resolution is synchronous and pure apart from the oracle query
//! - Exactly one locator per resolution, never a partial one
//! - "Handler returned nothing" is `EmptyOk`, never an error
//! - Fatal inputs fail fast with `ResolveError`

pub mod descriptor;
pub mod error;
pub mod identity;
pub mod locator;
pub mod resolver;

pub use descriptor::{IntoResultDescriptor, ResultDescriptor};
pub use error::ResolveError;
pub use identity::HandlerIdentity;
pub use locator::ViewLocator;
pub use resolver::PathResolver;
