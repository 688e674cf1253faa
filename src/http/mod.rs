//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! Local HTTP request
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (build ProxyRequest event, assign request ID)
//!     → routing layer dispatches to a rule
//!     → response.rs (envelope → HTTP response, 404/502 mapping)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{ProxyRequest, RequestContext, X_REQUEST_ID};
pub use response::{into_proxy_response, ProxyResponse};
pub use server::GatewayServer;
