//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the bridge.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the view bridge.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct BridgeConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// View naming conventions.
    pub view: ViewConfig,

    /// Forward dispatch settings.
    pub forward: ForwardConfig,

    /// Routes served outside this bridge that the route oracle must know about.
    pub routes: Vec<RouteConfig>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// What to do when the route oracle cannot answer.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OracleFailurePolicy {
    /// Treat as "no route" and use the default action.
    #[default]
    Fallback,
    /// Fail the request.
    Fail,
}

/// Legacy view naming conventions.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ViewConfig {
    /// Root that template paths are rebased under.
    pub view_root: String,

    /// File appended to forward paths that end in `/`.
    pub default_view: String,

    /// Action method used when a forwarded action path has no route.
    pub default_action: String,

    /// Extension marking an explicit template reference.
    pub template_extension: String,

    /// Suffix of the "back to index" helper paths.
    pub index_back_suffix: String,

    /// Handler name segment after which view directories start.
    pub action_marker: String,

    /// Length of the type suffix stripped from handler names (e.g. `Action`).
    pub handler_suffix_len: usize,

    /// Query marker that turns an absolute url into a redirect.
    pub redirect_marker: String,

    /// Prefix carried by redirect locators.
    pub redirect_prefix: String,

    /// Route oracle failure handling.
    pub on_oracle_failure: OracleFailurePolicy,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            view_root: "/WEB-INF/view".to_string(),
            default_view: "index.jsp".to_string(),
            default_action: "index".to_string(),
            template_extension: ".jsp".to_string(),
            index_back_suffix: "/indexBack".to_string(),
            action_marker: "action".to_string(),
            handler_suffix_len: 6,
            redirect_marker: "redirect=true".to_string(),
            redirect_prefix: "redirect:".to_string(),
            on_oracle_failure: OracleFailurePolicy::Fallback,
        }
    }
}

/// How forwards are served.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    /// Answer with an `x-view-path` header and leave rendering to the host.
    #[default]
    Header,
    /// Serve view files from `view_directory`.
    Files,
}

/// Forward dispatch configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ForwardConfig {
    /// Maximum chained action-to-action forwards per request.
    pub max_depth: u32,

    /// View renderer to hand view forwards to.
    pub renderer: RendererKind,

    /// Directory mapped to the view root when `renderer = "files"`.
    pub view_directory: Option<String>,
}

impl Default for ForwardConfig {
    fn default() -> Self {
        Self {
            max_depth: 8,
            renderer: RendererKind::Header,
            view_directory: None,
        }
    }
}

/// A route served by another layer.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct RouteConfig {
    /// Path pattern, e.g. `/users/{id}`.
    pub path: String,

    /// Allowed methods; empty means any.
    #[serde(default)]
    pub methods: Vec<String>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format ("pretty" or "json").
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: BridgeConfig = toml::from_str("").unwrap();
        assert_eq!(config, BridgeConfig::default());
        assert_eq!(config.view.view_root, "/WEB-INF/view");
        assert_eq!(config.view.handler_suffix_len, 6);
    }

    #[test]
    fn test_partial_sections() {
        let config: BridgeConfig = toml::from_str(
            r#"
            [view]
            view_root = "/views"
            on_oracle_failure = "fail"

            [forward]
            renderer = "files"
            view_directory = "./views"

            [[routes]]
            path = "/reports/{id}"
            methods = ["GET"]
            "#,
        )
        .unwrap();

        assert_eq!(config.view.view_root, "/views");
        assert_eq!(config.view.default_view, "index.jsp");
        assert_eq!(config.view.on_oracle_failure, OracleFailurePolicy::Fail);
        assert_eq!(config.forward.renderer, RendererKind::Files);
        assert_eq!(config.forward.max_depth, 8);
        assert_eq!(config.routes.len(), 1);
        assert_eq!(config.routes[0].methods, vec!["GET".to_string()]);
    }
}
