//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request (path, method)
//!     → router.rs (scan rules in registration order)
//!     → matcher.rs (evaluate the rule's predicate)
//!     → compose.rs (mounted routers: prefix check, then trial selection)
//!     → Return: handler result, fallback result, or NotFound
//!
//! Route registration (at startup):
//!     register / register_static / register_pattern / register_sub_table
//!     → Freeze behind an Arc, dispatch with &self
//! ```
//!
//! # Design Decisions
//! - Deterministic: registration order decides, first match wins
//! - No priorities, no backtracking, no path-parameter binding
//! - Handler results and errors are returned untouched

pub mod compose;
pub mod matcher;
pub mod request;
pub mod router;
pub mod rule;

pub use compose::SubRouter;
pub use matcher::{ExactMatcher, Matcher, PathPrefixMatcher, PatternMatcher};
pub use request::RouteRequest;
pub use router::{Dispatched, Router};
pub use rule::{FnHandler, Handler, Rule};
