//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Router, server and CLI produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (per-route counters and latency histograms)
//!
//! Consumers:
//!     → stderr (pretty for humans, JSON for log shipping)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging through `tracing`; `RUST_LOG` wins over config
//! - Request ID flows from the HTTP layer into every dispatch log line
//! - Metrics are cheap (atomic increments) and off the dispatch hot path

pub mod logging;
pub mod metrics;
