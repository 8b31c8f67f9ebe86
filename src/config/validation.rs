//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges and address formats
//! - Check view conventions are usable as path fragments
//! - Check declared routes compile
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: BridgeConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::Method;
use thiserror::Error;

use crate::config::schema::{BridgeConfig, RendererKind};
use crate::routing::matcher::RoutePattern;

/// A single semantic problem in a configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field}: invalid socket address `{value}`")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("view.view_root `{0}` must start with '/' and not end with '/'")]
    ViewRoot(String),

    #[error("view.action_marker `{0}` must be a single name segment")]
    ActionMarker(String),

    #[error("forward.view_directory is required when renderer = \"files\"")]
    MissingViewDirectory,

    #[error("route `{path}`: {reason}")]
    Route { path: String, reason: String },

    #[error("observability.log_format `{0}` must be \"pretty\" or \"json\"")]
    LogFormat(String),
}

/// Validate a parsed configuration, collecting every problem found.
pub fn validate_config(config: &BridgeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.request_secs"));
    }

    let view = &config.view;
    if !view.view_root.starts_with('/') || view.view_root.ends_with('/') {
        errors.push(ValidationError::ViewRoot(view.view_root.clone()));
    }
    if view.action_marker.is_empty() {
        errors.push(ValidationError::Empty("view.action_marker"));
    } else if view.action_marker.contains('.') {
        errors.push(ValidationError::ActionMarker(view.action_marker.clone()));
    }
    for (field, value) in [
        ("view.default_view", &view.default_view),
        ("view.default_action", &view.default_action),
        ("view.template_extension", &view.template_extension),
        ("view.index_back_suffix", &view.index_back_suffix),
        ("view.redirect_marker", &view.redirect_marker),
    ] {
        if value.is_empty() {
            errors.push(ValidationError::Empty(field));
        }
    }

    if config.forward.max_depth == 0 {
        errors.push(ValidationError::Zero("forward.max_depth"));
    }
    if config.forward.renderer == RendererKind::Files && config.forward.view_directory.is_none() {
        errors.push(ValidationError::MissingViewDirectory);
    }

    for route in &config.routes {
        if let Err(e) = RoutePattern::parse(&route.path) {
            errors.push(ValidationError::Route {
                path: route.path.clone(),
                reason: e.to_string(),
            });
        }
        for method in &route.methods {
            if Method::from_bytes(method.as_bytes()).is_err() {
                errors.push(ValidationError::Route {
                    path: route.path.clone(),
                    reason: format!("invalid method `{method}`"),
                });
            }
        }
    }

    let observability = &config.observability;
    if !matches!(observability.log_format.as_str(), "pretty" | "json") {
        errors.push(ValidationError::LogFormat(observability.log_format.clone()));
    }
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
