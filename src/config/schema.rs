//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Local server settings.
    pub server: ServerConfig,

    /// Logging and metrics settings.
    pub observability: ObservabilityConfig,

    /// The root route table.
    pub router: TableConfig,

    /// Named tables that can be mounted from other tables.
    pub tables: BTreeMap<String, TableConfig>,
}

/// Local server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:3000").
    pub bind_address: String,

    /// Request timeout (total time for dispatch and response) in seconds.
    pub request_timeout_secs: u64,

    /// Maximum accepted request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3000".to_string(),
            request_timeout_secs: 30,
            // Lambda's synchronous payload limit
            max_body_bytes: 6 * 1024 * 1024,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default filter directive, overridden by `RUST_LOG`.
    pub log_level: String,

    pub log_format: LogFormat,

    /// Expose Prometheus metrics.
    pub metrics_enabled: bool,

    /// Address for the metrics endpoint.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// One route table: ordered routes and an optional fallback.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct TableConfig {
    /// Routes in evaluation order.
    pub routes: Vec<RouteConfig>,

    /// Action taken when no route matches.
    pub fallback: Option<ActionConfig>,
}

impl TableConfig {
    /// Routes as the built router evaluates them: a repeated name keeps the
    /// slot of its first definition and takes the last definition's contents.
    pub fn effective_routes(&self) -> Vec<&RouteConfig> {
        let mut slots: Vec<&RouteConfig> = Vec::with_capacity(self.routes.len());
        let mut index: HashMap<&str, usize> = HashMap::new();

        for route in &self.routes {
            match index.get(route.name.as_str()) {
                Some(&pos) => slots[pos] = route,
                None => {
                    index.insert(route.name.as_str(), slots.len());
                    slots.push(route);
                }
            }
        }
        slots
    }
}

/// A single route.
///
/// Exactly one of `path`, `pattern` or `prefix` selects the rule kind:
/// static, regex, or a mounted table.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RouteConfig {
    /// Route identifier for logging/metrics.
    pub name: String,

    /// HTTP method, required for static and pattern routes.
    pub method: Option<String>,

    /// Exact path to match.
    pub path: Option<String>,

    /// Regex the path must contain a match for.
    pub pattern: Option<String>,

    /// Path prefix under which `table` is mounted.
    pub prefix: Option<String>,

    /// Name of the mounted table (in `tables`).
    pub table: Option<String>,

    /// What the route does when matched. Not used by mounts.
    pub action: Option<ActionConfig>,
}

/// The rule kind a route resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind<'a> {
    Static { path: &'a str },
    Pattern { pattern: &'a str },
    Mount { prefix: &'a str },
}

impl RouteConfig {
    /// Resolve the rule kind. `None` when zero or several of
    /// `path`/`pattern`/`prefix` are set.
    pub fn kind(&self) -> Option<RouteKind<'_>> {
        match (&self.path, &self.pattern, &self.prefix) {
            (Some(path), None, None) => Some(RouteKind::Static { path }),
            (None, Some(pattern), None) => Some(RouteKind::Pattern { pattern }),
            (None, None, Some(prefix)) => Some(RouteKind::Mount { prefix }),
            _ => None,
        }
    }
}

/// A canned handler.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ActionConfig {
    /// Return a fixed response.
    Fixed {
        #[serde(default = "default_status")]
        status: u16,

        #[serde(default)]
        body: String,

        content_type: Option<String>,

        #[serde(default)]
        headers: HashMap<String, String>,
    },

    /// Return the request as JSON.
    Echo,
}

fn default_status() -> u16 {
    200
}
