//! Local HTTP server for the gateway.
//!
//! # Responsibilities
//! - Create an Axum app that sends every path to the dispatch handler
//! - Wire up middleware (tracing, timeout, body limit, request ID)
//! - Convert HTTP requests into proxy events and dispatch them
//! - Record per-route metrics
//!
//! Dispatch is synchronous and handlers may block, so it runs on the
//! blocking pool rather than on the async workers.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::http::request::ProxyRequest;
use crate::http::response::{into_proxy_response, ProxyResponse};
use crate::observability::metrics;
use crate::GatewayRouter;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<GatewayRouter>,
    pub max_body_bytes: usize,
}

/// HTTP server in front of a [`GatewayRouter`].
pub struct GatewayServer {
    app: Router,
    config: ServerConfig,
}

impl GatewayServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(router: Arc<GatewayRouter>, config: ServerConfig) -> Self {
        let state = AppState {
            router,
            max_body_bytes: config.max_body_bytes,
        };
        let app = Self::build_app(&config, state);
        Self { app, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_app(config: &ServerConfig, state: AppState) -> Router {
        Router::new()
            .fallback(gateway_handler)
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
            .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The Axum app, for serving it elsewhere or driving it in tests.
    pub fn app(&self) -> Router {
        self.app.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Run the server until a shutdown signal arrives.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Turn the HTTP request into a proxy event and dispatch it.
async fn gateway_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let (parts, body) = request.into_parts();

    let body = match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(error = %e, path = %parts.uri.path(), "Failed to read request body");
            metrics::record_request("none", StatusCode::PAYLOAD_TOO_LARGE.as_u16(), start_time);
            return (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response();
        }
    };

    let event = ProxyRequest::from_parts(&parts, &body);
    let request_id = event.request_id().to_string();

    tracing::debug!(
        request_id = %request_id,
        method = %event.http_method,
        path = %event.path,
        "Dispatching request"
    );

    let router = Arc::clone(&state.router);
    let dispatched = tokio::task::spawn_blocking(move || {
        let dispatched = router.dispatch(&event);
        (dispatched.route.map(str::to_string), dispatched.result)
    })
    .await;

    let (route, result) = match dispatched {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Dispatch task failed");
            metrics::record_request("none", 500, start_time);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response();
        }
    };

    let route = route.unwrap_or_else(|| "none".to_string());
    if let Err(e) = &result {
        if e.is_not_found() {
            tracing::warn!(request_id = %request_id, path = %parts.uri.path(), "No route matched");
        }
    }

    let response: ProxyResponse = into_proxy_response(result);
    metrics::record_request(&route, response.status_code, start_time);
    tracing::debug!(
        request_id = %request_id,
        route = %route,
        status = response.status_code,
        "Request handled"
    );

    response.into_response()
}
