//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → (logging installed from `observability`)
//!     → validation.rs (semantic checks)
//!     → build.rs (tables → routers, mounts → sub-table rules)
//!     → GatewayRouter (immutable, shared via Arc)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod build;
pub mod loader;
pub mod schema;
pub mod tree;
pub mod validation;

pub use build::{build_router, Action, BuildError};
pub use loader::{load_config, load_gateway, parse_config, prepare_gateway, read_config, ConfigError};
pub use schema::{ActionConfig, GatewayConfig, ObservabilityConfig, RouteConfig, ServerConfig, TableConfig};
pub use tree::render_route_tree;
pub use validation::{validate_config, ValidationError};
