//! Rule predicates.
//!
//! # Responsibilities
//! - Exact match on path and method
//! - Regex match on path plus exact method
//! - Path prefix match (used to mount nested routers)
//! - Arbitrary predicates from closures
//!
//! # Design Decisions
//! - Path and method matching are case-sensitive
//! - Regex matching is unanchored ("contains a match"); callers anchor with `^...$`
//! - Prefix matching is a plain `starts_with`, no regex in the mount check
//! - Matchers are pure: no mutation, no side effects

use std::marker::PhantomData;

use regex::Regex;

use crate::routing::request::RouteRequest;

/// Trait for matching requests against conditions.
pub trait Matcher<Req>: Send + Sync {
    /// Returns true if the request matches this condition.
    fn matches(&self, req: &Req) -> bool;
}

/// Matches an exact `(method, path)` pair.
#[derive(Debug, Clone)]
pub struct ExactMatcher {
    method: String,
    path: String,
}

impl ExactMatcher {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
        }
    }
}

impl<Req: RouteRequest> Matcher<Req> for ExactMatcher {
    fn matches(&self, req: &Req) -> bool {
        req.path() == self.path && req.method() == self.method
    }
}

/// Matches when the regex finds a match anywhere in the path and the method
/// is equal.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    method: String,
    pattern: Regex,
}

impl PatternMatcher {
    /// The pattern is compiled by the caller; an invalid pattern never gets here.
    pub fn new(method: impl Into<String>, pattern: Regex) -> Self {
        Self {
            method: method.into(),
            pattern,
        }
    }
}

impl<Req: RouteRequest> Matcher<Req> for PatternMatcher {
    fn matches(&self, req: &Req) -> bool {
        req.method() == self.method && self.pattern.is_match(req.path())
    }
}

/// Matches the request path prefix.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl<Req: RouteRequest> Matcher<Req> for PathPrefixMatcher {
    fn matches(&self, req: &Req) -> bool {
        req.path().starts_with(&self.prefix)
    }
}

/// Adapts a closure into a [`Matcher`].
pub struct FnMatcher<F, Req> {
    f: F,
    _req: PhantomData<fn(&Req)>,
}

/// Build a matcher from a predicate closure.
pub fn from_fn<Req, F>(f: F) -> FnMatcher<F, Req>
where
    F: Fn(&Req) -> bool + Send + Sync,
{
    FnMatcher {
        f,
        _req: PhantomData,
    }
}

impl<F, Req> Matcher<Req> for FnMatcher<F, Req>
where
    F: Fn(&Req) -> bool + Send + Sync,
{
    fn matches(&self, req: &Req) -> bool {
        (self.f)(req)
    }
}
