//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use gateway_router::config::{build_router, parse_config, GatewayConfig};
use gateway_router::{GatewayRouter, GatewayServer, Shutdown};
use tokio::net::TcpListener;

/// A small gateway: two root routes, one mounted table and a fallback.
pub const GATEWAY_TOML: &str = r#"
[router]
fallback = { type = "fixed", status = 404, body = "custom miss" }

[[router.routes]]
name = "health"
method = "GET"
path = "/health"
action = { type = "fixed", body = "ok" }

[[router.routes]]
name = "users"
method = "GET"
pattern = "^/users/[0-9]+$"
action = { type = "echo" }

[[router.routes]]
name = "api"
prefix = "/api"
table = "api"

[[tables.api.routes]]
name = "items"
method = "GET"
path = "/api/items"
action = { type = "fixed", body = "[]", content_type = "application/json" }

[[tables.api.routes]]
name = "create"
method = "POST"
path = "/api/items"
action = { type = "fixed", status = 201, body = "created" }
"#;

pub fn gateway_config() -> GatewayConfig {
    parse_config(GATEWAY_TOML).unwrap()
}

#[allow(dead_code)]
pub fn gateway_router() -> GatewayRouter {
    build_router(&gateway_config()).unwrap()
}

/// Start the gateway on an ephemeral port.
#[allow(dead_code)]
pub async fn start_gateway(shutdown: &Shutdown) -> (SocketAddr, tokio::task::JoinHandle<()>) {
    let config = gateway_config();
    let router = Arc::new(build_router(&config).unwrap());
    let server = GatewayServer::new(router, config.server.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server_shutdown = shutdown.subscribe();

    let handle = tokio::spawn(async move {
        server.run(listener, server_shutdown).await.unwrap();
    });

    // Give the accept loop a moment to start.
    tokio::time::sleep(Duration::from_millis(50)).await;
    (addr, handle)
}
