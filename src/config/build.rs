//! Turning a validated configuration into a router.
//!
//! Each table becomes a [`GatewayRouter`]; mounts become sub-table rules.
//! A table mounted from several places is built once and shared.

use std::collections::HashMap;
use std::sync::Arc;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use crate::config::schema::{ActionConfig, GatewayConfig, RouteKind, TableConfig};
use crate::config::validation::ROOT_TABLE;
use crate::error::BoxError;
use crate::http::{ProxyRequest, ProxyResponse};
use crate::routing::RouteRequest;
use crate::GatewayRouter;

/// Errors raised while building routers from configuration.
///
/// Validation catches all of these first; the builder still refuses to
/// produce a half-built router if handed an unvalidated config.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("{table}.{route}: route is incomplete or ambiguous")]
    InvalidRoute { table: String, route: String },

    #[error("{table}.{route}: invalid pattern")]
    InvalidPattern {
        table: String,
        route: String,
        #[source]
        source: regex::Error,
    },

    #[error("unknown table `{0}`")]
    UnknownTable(String),

    #[error("mount cycle through table `{0}`")]
    MountCycle(String),
}

/// What a configured route does once matched.
#[derive(Debug, Clone)]
pub enum Action {
    Fixed(ProxyResponse),
    Echo,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Echo<'a> {
    method: &'a str,
    path: &'a str,
    query: &'a HashMap<String, String>,
    headers: &'a HashMap<String, String>,
    body: Option<&'a str>,
    request_id: &'a str,
}

impl Action {
    pub fn from_config(action: &ActionConfig) -> Self {
        match action {
            ActionConfig::Fixed {
                status,
                body,
                content_type,
                headers,
            } => {
                let mut response = ProxyResponse::text(*status, body.clone());
                for (name, value) in headers {
                    response = response.with_header(name.to_ascii_lowercase(), value.clone());
                }
                if let Some(content_type) = content_type {
                    response = response.with_header("content-type", content_type.clone());
                }
                Action::Fixed(response)
            }
            ActionConfig::Echo => Action::Echo,
        }
    }

    pub fn respond(&self, req: &ProxyRequest) -> Result<ProxyResponse, BoxError> {
        match self {
            Action::Fixed(response) => Ok(response.clone()),
            Action::Echo => {
                let echo = Echo {
                    method: req.method(),
                    path: req.path(),
                    query: &req.query_string_parameters,
                    headers: &req.headers,
                    body: req.body.as_deref(),
                    request_id: req.request_id(),
                };
                Ok(ProxyResponse::json(200, &echo)?)
            }
        }
    }
}

/// Build the root router described by `config`.
pub fn build_router(config: &GatewayConfig) -> Result<GatewayRouter, BuildError> {
    let mut builder = Builder {
        config,
        built: HashMap::new(),
        visiting: vec![ROOT_TABLE.to_string()],
    };
    let router = builder.build_table(ROOT_TABLE, &config.router)?;

    tracing::info!(
        routes = router.len(),
        tables = builder.built.len(),
        "Router built"
    );
    Ok(router)
}

struct Builder<'a> {
    config: &'a GatewayConfig,
    built: HashMap<String, Arc<GatewayRouter>>,
    visiting: Vec<String>,
}

impl Builder<'_> {
    fn build_table(&mut self, table_name: &str, table: &TableConfig) -> Result<GatewayRouter, BuildError> {
        let mut router = GatewayRouter::new();

        for route in &table.routes {
            let invalid = || BuildError::InvalidRoute {
                table: table_name.to_string(),
                route: route.name.clone(),
            };
            let kind = route.kind().ok_or_else(invalid)?;

            match kind {
                RouteKind::Static { path } => {
                    let method = route.method.as_deref().ok_or_else(invalid)?;
                    let action = Action::from_config(route.action.as_ref().ok_or_else(invalid)?);
                    router.register_static(&route.name, method, path, move |req| action.respond(req));
                }
                RouteKind::Pattern { pattern } => {
                    let method = route.method.as_deref().ok_or_else(invalid)?;
                    let action = Action::from_config(route.action.as_ref().ok_or_else(invalid)?);
                    let regex = Regex::new(pattern).map_err(|source| BuildError::InvalidPattern {
                        table: table_name.to_string(),
                        route: route.name.clone(),
                        source,
                    })?;
                    router.register_pattern(&route.name, method, regex, move |req| action.respond(req));
                }
                RouteKind::Mount { prefix } => {
                    let target = route.table.as_deref().ok_or_else(invalid)?;
                    let sub = self.mounted(target)?;
                    router.register_sub_table(&route.name, prefix, sub);
                }
            }
            tracing::debug!(table = %table_name, route = %route.name, "Registered route");
        }

        if let Some(fallback) = &table.fallback {
            let action = Action::from_config(fallback);
            router.set_fallback(move |req| action.respond(req));
        }

        Ok(router)
    }

    fn mounted(&mut self, target: &str) -> Result<Arc<GatewayRouter>, BuildError> {
        if let Some(router) = self.built.get(target) {
            return Ok(Arc::clone(router));
        }
        if self.visiting.iter().any(|t| t == target) {
            return Err(BuildError::MountCycle(target.to_string()));
        }
        let config = self.config;
        let table = config
            .tables
            .get(target)
            .ok_or_else(|| BuildError::UnknownTable(target.to_string()))?;

        self.visiting.push(target.to_string());
        let router = Arc::new(self.build_table(target, table)?);
        self.visiting.pop();

        self.built.insert(target.to_string(), Arc::clone(&router));
        Ok(router)
    }
}
