//! Human-readable listing of the route tree.
//!
//! Routes are listed the way the built router evaluates them, so a name that
//! is defined twice shows up once, in its first slot, with its last definition.

use std::fmt::Write;

use crate::config::schema::{GatewayConfig, RouteKind, TableConfig};
use crate::config::validation::ROOT_TABLE;

/// Render every table reachable from the root, mounts indented under their parent.
pub fn render_route_tree(config: &GatewayConfig) -> String {
    let mut out = String::new();
    render_table(&mut out, config, ROOT_TABLE, &config.router, 0);
    out
}

fn render_table(out: &mut String, config: &GatewayConfig, name: &str, table: &TableConfig, depth: usize) {
    let indent = "  ".repeat(depth);
    // Writing into a String cannot fail.
    let _ = writeln!(out, "{indent}[{name}]");

    for route in table.effective_routes() {
        let method = route.method.as_deref().unwrap_or("*");
        let _ = match route.kind() {
            Some(RouteKind::Static { path }) => {
                writeln!(out, "{indent}  {:<20} {method} {path}", route.name)
            }
            Some(RouteKind::Pattern { pattern }) => {
                writeln!(out, "{indent}  {:<20} {method} ~{pattern}", route.name)
            }
            Some(RouteKind::Mount { prefix }) => {
                let target = route.table.as_deref().unwrap_or_default();
                let _ = writeln!(out, "{indent}  {:<20} {prefix}* -> {target}", route.name);
                // Validation has already rejected cycles.
                if let Some(sub) = config.tables.get(target) {
                    render_table(out, config, target, sub, depth + 2);
                }
                Ok(())
            }
            None => writeln!(out, "{indent}  {:<20} (invalid)", route.name),
        };
    }

    if table.fallback.is_some() {
        let _ = writeln!(out, "{indent}  (fallback)");
    }
}
