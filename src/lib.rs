//! Request dispatch for serverless HTTP front-ends.
//!
//! A [`Router`](routing::Router) holds named rules in registration order and
//! hands each request to the first rule whose predicate matches. Routers
//! nest: a whole router can be mounted under a path prefix as a single rule.
//!
//! ```
//! use gateway_router::http::{ProxyRequest, ProxyResponse};
//! use gateway_router::routing::Router;
//!
//! let mut api: Router<ProxyRequest, ProxyResponse, String> = Router::new();
//! api.register_static("items", "GET", "/api/items", |_| Ok(ProxyResponse::text(200, "[]")));
//!
//! let mut root: Router<ProxyRequest, ProxyResponse, String> = Router::new();
//! root.register_static("health", "GET", "/health", |_| Ok(ProxyResponse::text(200, "ok")))
//!     .register_sub_table("api", "/api", api);
//!
//! let dispatched = root.dispatch(&ProxyRequest::new("GET", "/api/items"));
//! assert_eq!(dispatched.route, Some("api"));
//! assert_eq!(dispatched.result.unwrap().body, "[]");
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::GatewayConfig;
pub use error::{BoxError, DispatchError};
pub use http::GatewayServer;
pub use lifecycle::Shutdown;

/// The router built from configuration and served by [`GatewayServer`].
pub type GatewayRouter = routing::Router<http::ProxyRequest, http::ProxyResponse, BoxError>;
