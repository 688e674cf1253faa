//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (mounts reference existing tables)
//! - Reject mount cycles and regexes that do not compile
//! - Validate value ranges (status codes, timeouts, addresses)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Duplicate route names are legal (last one wins) and only logged

use std::collections::HashSet;
use std::net::SocketAddr;

use regex::Regex;
use thiserror::Error;

use crate::config::schema::{ActionConfig, GatewayConfig, RouteKind, TableConfig};

/// Name used for the root table in error messages.
pub const ROOT_TABLE: &str = "router";

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{table}.{route}: exactly one of `path`, `pattern` or `prefix` must be set")]
    AmbiguousMatch { table: String, route: String },

    #[error("{table}.{route}: `method` is required for path and pattern routes")]
    MissingMethod { table: String, route: String },

    #[error("{table}.{route}: invalid pattern: {reason}")]
    InvalidPattern { table: String, route: String, reason: String },

    #[error("{table}.{route}: `action` is required for path and pattern routes")]
    MissingAction { table: String, route: String },

    #[error("{table}.{route}: `prefix` and `table` must be set together")]
    IncompleteMount { table: String, route: String },

    #[error("{table}.{route}: mounts cannot have an `action`")]
    MountWithAction { table: String, route: String },

    #[error("{table}.{route}: unknown table `{target}`")]
    UnknownTable { table: String, route: String, target: String },

    #[error("mount cycle: {0}")]
    MountCycle(String),

    #[error("{table}: status {status} is outside 100-599")]
    InvalidStatus { table: String, status: u16 },

    #[error("{field}: `{value}` is not a socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "server.bind_address",
            value: config.server.bind_address.clone(),
        });
    }
    if config.server.request_timeout_secs == 0 {
        errors.push(ValidationError::Zero("server.request_timeout_secs"));
    }
    if config.server.max_body_bytes == 0 {
        errors.push(ValidationError::Zero("server.max_body_bytes"));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    validate_table(ROOT_TABLE, &config.router, config, &mut errors);
    for (name, table) in &config.tables {
        validate_table(name, table, config, &mut errors);
    }

    let mut path = vec![ROOT_TABLE.to_string()];
    find_cycles(&config.router, config, &mut path, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_table(
    table_name: &str,
    table: &TableConfig,
    config: &GatewayConfig,
    errors: &mut Vec<ValidationError>,
) {
    let mut seen = HashSet::new();

    for route in &table.routes {
        let ctx = || (table_name.to_string(), route.name.clone());

        if !seen.insert(route.name.as_str()) {
            tracing::warn!(table = %table_name, route = %route.name, "Duplicate route name, last definition wins");
        }

        let Some(kind) = route.kind() else {
            let (table, route) = ctx();
            errors.push(ValidationError::AmbiguousMatch { table, route });
            continue;
        };

        match kind {
            RouteKind::Static { .. } | RouteKind::Pattern { .. } => {
                if route.method.is_none() {
                    let (table, route) = ctx();
                    errors.push(ValidationError::MissingMethod { table, route });
                }
                match &route.action {
                    Some(action) => validate_action(table_name, action, errors),
                    None => {
                        let (table, route) = ctx();
                        errors.push(ValidationError::MissingAction { table, route });
                    }
                }
                if route.table.is_some() {
                    let (table, route) = ctx();
                    errors.push(ValidationError::IncompleteMount { table, route });
                }
                if let RouteKind::Pattern { pattern } = kind {
                    if let Err(e) = Regex::new(pattern) {
                        let (table, route) = ctx();
                        errors.push(ValidationError::InvalidPattern {
                            table,
                            route,
                            reason: e.to_string(),
                        });
                    }
                }
            }
            RouteKind::Mount { .. } => {
                if route.action.is_some() {
                    let (table, route) = ctx();
                    errors.push(ValidationError::MountWithAction { table, route });
                }
                match &route.table {
                    Some(target) if !config.tables.contains_key(target) => {
                        let (table, route) = ctx();
                        errors.push(ValidationError::UnknownTable {
                            table,
                            route,
                            target: target.clone(),
                        });
                    }
                    Some(_) => {}
                    None => {
                        let (table, route) = ctx();
                        errors.push(ValidationError::IncompleteMount { table, route });
                    }
                }
            }
        }
    }

    if let Some(fallback) = &table.fallback {
        validate_action(table_name, fallback, errors);
    }
}

fn validate_action(table: &str, action: &ActionConfig, errors: &mut Vec<ValidationError>) {
    if let ActionConfig::Fixed { status, .. } = action {
        if !(100..=599).contains(status) {
            errors.push(ValidationError::InvalidStatus {
                table: table.to_string(),
                status: *status,
            });
        }
    }
}

/// Depth-first walk over mounts; `path` holds the tables currently being visited.
fn find_cycles(
    table: &TableConfig,
    config: &GatewayConfig,
    path: &mut Vec<String>,
    errors: &mut Vec<ValidationError>,
) {
    for route in &table.routes {
        let Some(RouteKind::Mount { .. }) = route.kind() else {
            continue;
        };
        let Some(target) = &route.table else {
            continue;
        };
        let Some(next) = config.tables.get(target) else {
            continue;
        };

        if path.contains(target) {
            let cycle = format!("{} -> {}", path.join(" -> "), target);
            let error = ValidationError::MountCycle(cycle);
            if !errors.contains(&error) {
                errors.push(error);
            }
            continue;
        }

        path.push(target.clone());
        find_cycles(next, config, path, errors);
        path.pop();
    }
}
