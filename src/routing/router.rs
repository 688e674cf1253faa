//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Store named rules in registration order
//! - Select the first rule whose predicate holds
//! - Invoke it, or the fallback, or report `NotFound`
//!
//! # Design Decisions
//! - Ordered `Vec` plus a name index: deterministic scan, O(1) replace-by-name
//! - Re-registering a name replaces the rule in place and keeps its position
//! - The matched name is returned from each call; `last_matched` is advisory only
//! - Registration needs `&mut self`, dispatch only `&self`, so a populated
//!   router can be shared behind an `Arc` without locks

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use regex::Regex;

use crate::error::DispatchError;
use crate::routing::compose::SubRouter;
use crate::routing::matcher::{ExactMatcher, PatternMatcher};
use crate::routing::request::RouteRequest;
use crate::routing::rule::{FnHandler, Handler, Rule};

/// Outcome of a single [`Router::dispatch`] call.
#[derive(Debug)]
pub struct Dispatched<'r, Res, E> {
    /// Name of the rule that handled the request. `None` when the fallback
    /// ran or nothing matched.
    pub route: Option<&'r str>,

    /// The handler's result, unchanged.
    pub result: Result<Res, DispatchError<E>>,
}

/// An ordered table of named rules evaluated first-match-wins.
pub struct Router<Req, Res, E> {
    rules: Vec<(String, Rule<Req, Res, E>)>,
    index: HashMap<String, usize>,
    fallback: Option<Box<dyn Handler<Req, Res, E>>>,
    last_matched: ArcSwapOption<String>,
}

impl<Req, Res, E> Router<Req, Res, E> {
    /// Create a new empty router.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            index: HashMap::new(),
            fallback: None,
            last_matched: ArcSwapOption::empty(),
        }
    }

    /// Insert a rule under `name`, replacing any rule already registered
    /// under that name. There is no clash detection.
    pub fn register(&mut self, name: impl Into<String>, rule: Rule<Req, Res, E>) -> &mut Self {
        let name = name.into();
        match self.index.get(&name).copied() {
            Some(pos) => {
                tracing::debug!(route = %name, "Replacing existing route");
                self.rules[pos].1 = rule;
            }
            None => {
                self.index.insert(name.clone(), self.rules.len());
                self.rules.push((name, rule));
            }
        }
        self
    }

    /// Remove a rule by name. Later rules keep their relative order.
    pub fn remove(&mut self, name: &str) -> Option<Rule<Req, Res, E>> {
        let pos = self.index.remove(name)?;
        let (_, rule) = self.rules.remove(pos);
        for (name, _) in &self.rules[pos..] {
            if let Some(p) = self.index.get_mut(name) {
                *p -= 1;
            }
        }
        Some(rule)
    }

    pub fn get(&self, name: &str) -> Option<&Rule<Req, Res, E>> {
        self.index.get(name).map(|&pos| &self.rules[pos].1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Rule names in evaluation order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    /// Find the first rule whose predicate holds, without invoking it.
    pub fn select(&self, req: &Req) -> Option<(&str, &Rule<Req, Res, E>)> {
        self.rules
            .iter()
            .find(|(_, rule)| rule.matches(req))
            .map(|(name, rule)| (name.as_str(), rule))
    }

    /// Name of the rule most recently dispatched to by this router.
    ///
    /// Diagnostic only. When one router serves overlapping requests this may
    /// name a rule chosen for a different request; use [`Dispatched::route`]
    /// for the request you actually dispatched.
    pub fn last_matched(&self) -> Option<Arc<String>> {
        self.last_matched.load_full()
    }
}

impl<Req: 'static, Res: 'static, E: 'static> Router<Req, Res, E> {
    /// Install a handler that runs when no rule matches.
    pub fn set_fallback<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&Req) -> Result<Res, E> + Send + Sync + 'static,
    {
        self.set_fallback_handler(FnHandler::new(handler))
    }

    pub fn set_fallback_handler<H>(&mut self, handler: H) -> &mut Self
    where
        H: Handler<Req, Res, E> + 'static,
    {
        self.fallback = Some(Box::new(handler));
        self
    }
}

impl<Req: RouteRequest + 'static, Res: 'static, E: 'static> Router<Req, Res, E> {
    /// Register a rule matching an exact method and path.
    pub fn register_static<F>(
        &mut self,
        name: impl Into<String>,
        method: impl Into<String>,
        path: impl Into<String>,
        handler: F,
    ) -> &mut Self
    where
        F: Fn(&Req) -> Result<Res, E> + Send + Sync + 'static,
    {
        self.register(name, Rule::new(ExactMatcher::new(method, path), handler))
    }

    /// Register a rule matching a method and a path regex.
    ///
    /// The regex is unanchored; anchor it with `^...$` for whole-path matches.
    pub fn register_pattern<F>(
        &mut self,
        name: impl Into<String>,
        method: impl Into<String>,
        pattern: Regex,
        handler: F,
    ) -> &mut Self
    where
        F: Fn(&Req) -> Result<Res, E> + Send + Sync + 'static,
    {
        self.register(name, Rule::new(PatternMatcher::new(method, pattern), handler))
    }

    /// Mount `sub` under `prefix`.
    ///
    /// The mounted router matches when the path starts with `prefix` and one
    /// of its own rules matches. It receives the full, unmodified request, so
    /// its rules must spell out complete paths including the prefix.
    pub fn register_sub_table(
        &mut self,
        name: impl Into<String>,
        prefix: impl Into<String>,
        sub: impl Into<Arc<Router<Req, Res, E>>>,
    ) -> &mut Self {
        let sub = SubRouter::new(prefix, sub);
        self.register(name, Rule::from_parts(sub.clone(), sub))
    }

    /// Select a rule and run it.
    pub fn dispatch(&self, req: &Req) -> Dispatched<'_, Res, E> {
        if let Some((name, rule)) = self.select(req) {
            tracing::debug!(route = %name, method = req.method(), path = req.path(), "Route matched");
            self.last_matched.store(Some(Arc::new(name.to_string())));
            return Dispatched {
                route: Some(name),
                result: rule.handle(req),
            };
        }

        let result = match &self.fallback {
            Some(fallback) => {
                tracing::debug!(method = req.method(), path = req.path(), "No route matched, using fallback");
                fallback.handle(req)
            }
            None => {
                tracing::debug!(method = req.method(), path = req.path(), "No route matched");
                Err(DispatchError::NotFound)
            }
        };
        Dispatched {
            route: None,
            result,
        }
    }

    /// Dispatch and return only the handler result.
    pub fn handle(&self, req: &Req) -> Result<Res, DispatchError<E>> {
        self.dispatch(req).result
    }
}

impl<Req, Res, E> Default for Router<Req, Res, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Req, Res, E> std::fmt::Debug for Router<Req, Res, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.names().collect::<Vec<_>>())
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use crate::http::{ProxyRequest, ProxyResponse};

    type TestRouter = Router<ProxyRequest, ProxyResponse, String>;

    fn ok(body: &'static str) -> impl Fn(&ProxyRequest) -> Result<ProxyResponse, String> {
        move |_| Ok(ProxyResponse::text(200, body))
    }

    fn always(body: &'static str) -> Rule<ProxyRequest, ProxyResponse, String> {
        Rule::from_fn(|_| true, ok(body))
    }

    #[test]
    fn test_new_router_is_empty() {
        let router = TestRouter::new();
        assert!(router.is_empty());
        assert!(router.last_matched().is_none());
    }

    #[test]
    fn test_empty_router_returns_not_found() {
        let router = TestRouter::new();

        for (method, path) in [("GET", "/"), ("POST", "/test"), ("DELETE", "")] {
            let dispatched = router.dispatch(&ProxyRequest::new(method, path));
            assert!(dispatched.route.is_none());
            assert!(dispatched.result.unwrap_err().is_not_found());
        }
    }

    #[test]
    fn test_register_adds_route() {
        let mut router = TestRouter::new();
        router.register("test", always("x"));

        assert!(router.contains("test"));
        assert_eq!(router.len(), 1);
    }

    #[test]
    fn test_handler_result_passes_through() {
        let mut router = TestRouter::new();
        router.register(
            "test",
            Rule::from_fn(|_| true, |_| {
                Ok(ProxyResponse::text(201, "Test").with_header("x-custom", "1"))
            }),
        );

        let dispatched = router.dispatch(&ProxyRequest::new("POST", "/test"));
        assert_eq!(dispatched.route, Some("test"));
        assert_eq!(
            dispatched.result.unwrap(),
            ProxyResponse::text(201, "Test").with_header("x-custom", "1")
        );
    }

    #[test]
    fn test_handler_error_passes_through() {
        let mut router = TestRouter::new();
        router.register("broken", Rule::from_fn(|_| true, |_| Err("db down".to_string())));

        let err = router.handle(&ProxyRequest::new("GET", "/")).unwrap_err();
        assert_eq!(err.into_handler_error().as_deref(), Some("db down"));
    }

    #[test]
    fn test_handler_is_called_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let mut router = TestRouter::new();
        router.register(
            "test",
            Rule::from_fn(|_| true, move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(ProxyResponse::default())
            }),
        );

        router.handle(&ProxyRequest::new("GET", "/test")).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_static_route() {
        let mut router = TestRouter::new();
        router.register_static("test", "GET", "/test", ok("static"));

        assert_eq!(router.dispatch(&ProxyRequest::new("GET", "/test")).route, Some("test"));
        assert!(router.dispatch(&ProxyRequest::new("GET", "/blah")).route.is_none());
        assert!(router.dispatch(&ProxyRequest::new("POST", "/test")).route.is_none());
    }

    #[test]
    fn test_pattern_route() {
        let mut router = TestRouter::new();
        router.register_pattern("test", "GET", Regex::new("^/test$").unwrap(), ok("pattern"));

        assert_eq!(router.dispatch(&ProxyRequest::new("GET", "/test")).route, Some("test"));
        assert!(router.dispatch(&ProxyRequest::new("GET", "/blah")).route.is_none());
        assert!(router.dispatch(&ProxyRequest::new("POST", "/test")).route.is_none());
    }

    #[test]
    fn test_first_registered_wins() {
        // Enough overlapping routes that any hash-order iteration would show.
        let mut router = TestRouter::new();
        for i in 0..32 {
            router.register(format!("route-{i}"), Rule::from_fn(|_| true, ok("any")));
        }

        for _ in 0..10 {
            let dispatched = router.dispatch(&ProxyRequest::new("GET", "/"));
            assert_eq!(dispatched.route, Some("route-0"));
        }
        assert_eq!(router.names().next(), Some("route-0"));
        assert_eq!(router.names().last(), Some("route-31"));
    }

    #[test]
    fn test_later_route_only_when_earlier_misses() {
        let mut router = TestRouter::new();
        router
            .register_static("exact", "GET", "/items/special", ok("special"))
            .register_pattern("items", "GET", Regex::new("^/items/").unwrap(), ok("items"));

        let special = router.dispatch(&ProxyRequest::new("GET", "/items/special"));
        assert_eq!(special.route, Some("exact"));
        assert_eq!(special.result.unwrap().body, "special");

        let other = router.dispatch(&ProxyRequest::new("GET", "/items/7"));
        assert_eq!(other.route, Some("items"));
    }

    #[test]
    fn test_reregister_replaces_route() {
        let mut router = TestRouter::new();
        router
            .register("r", Rule::from_fn(|req: &ProxyRequest| req.path() == "/a", ok("A")))
            .register("other", always("other"))
            .register("r", Rule::from_fn(|req: &ProxyRequest| req.path() == "/b", ok("B")));

        assert_eq!(router.len(), 2);
        // Replacement keeps the first slot.
        assert_eq!(router.names().collect::<Vec<_>>(), vec!["r", "other"]);

        let a = router.dispatch(&ProxyRequest::new("GET", "/a"));
        assert_eq!(a.route, Some("other"));

        let b = router.dispatch(&ProxyRequest::new("GET", "/b"));
        assert_eq!(b.route, Some("r"));
        assert_eq!(b.result.unwrap().body, "B");
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut router = TestRouter::new();
        router
            .register("a", always("a"))
            .register("b", always("b"))
            .register("c", always("c"));

        assert!(router.remove("a").is_some());
        assert!(router.remove("a").is_none());
        assert_eq!(router.names().collect::<Vec<_>>(), vec!["b", "c"]);

        router.register("c", always("c2"));
        assert_eq!(router.names().collect::<Vec<_>>(), vec!["b", "c"]);
        assert!(router.get("c").is_some());
        assert_eq!(router.dispatch(&ProxyRequest::new("GET", "/")).route, Some("b"));
    }

    #[test]
    fn test_fallback_used_when_nothing_matches() {
        let mut router = TestRouter::new();
        router
            .register_static("test", "GET", "/test", ok("test"))
            .set_fallback(|req: &ProxyRequest| Ok(ProxyResponse::text(404, req.path())));

        let miss = router.dispatch(&ProxyRequest::new("GET", "/nope"));
        assert!(miss.route.is_none());
        assert_eq!(miss.result.unwrap(), ProxyResponse::text(404, "/nope"));

        let hit = router.dispatch(&ProxyRequest::new("GET", "/test"));
        assert_eq!(hit.result.unwrap().body, "test");
    }

    #[test]
    fn test_fallback_error_passes_through() {
        let mut router = TestRouter::new();
        router.set_fallback(|_| Err("fallback failed".to_string()));

        let err = router.handle(&ProxyRequest::new("GET", "/")).unwrap_err();
        assert!(!err.is_not_found());
        assert_eq!(err.to_string(), "fallback failed");
    }

    #[test]
    fn test_last_matched_tracks_dispatch() {
        let mut router = TestRouter::new();
        router
            .register_static("a", "GET", "/a", ok("a"))
            .register_static("b", "GET", "/b", ok("b"));

        router.handle(&ProxyRequest::new("GET", "/a")).unwrap();
        assert_eq!(router.last_matched().as_deref().map(String::as_str), Some("a"));

        router.handle(&ProxyRequest::new("GET", "/b")).unwrap();
        assert_eq!(router.last_matched().as_deref().map(String::as_str), Some("b"));

        // A miss does not overwrite it.
        router.handle(&ProxyRequest::new("GET", "/c")).unwrap_err();
        assert_eq!(router.last_matched().as_deref().map(String::as_str), Some("b"));
    }

    #[test]
    fn test_dispatch_is_idempotent() {
        let mut router = TestRouter::new();
        router
            .register_static("a", "GET", "/a", ok("a"))
            .register_pattern("b", "GET", Regex::new("^/b").unwrap(), ok("b"));

        for req in [
            ProxyRequest::new("GET", "/a"),
            ProxyRequest::new("GET", "/bee"),
            ProxyRequest::new("GET", "/c"),
        ] {
            let first = router.dispatch(&req);
            let second = router.dispatch(&req);
            assert_eq!(first.route, second.route);
            assert_eq!(first.result.ok(), second.result.ok());
        }
    }

    #[test]
    fn test_concurrent_dispatch_reports_own_route() {
        let mut router = TestRouter::new();
        for i in 0..8 {
            router.register_static(format!("r{i}"), "GET", format!("/r{i}"), ok("x"));
        }
        let router = Arc::new(router);

        std::thread::scope(|s| {
            for i in 0..8 {
                let router = router.clone();
                s.spawn(move || {
                    let req = ProxyRequest::new("GET", format!("/r{i}"));
                    let expected = format!("r{i}");
                    for _ in 0..200 {
                        let dispatched = router.dispatch(&req);
                        assert_eq!(dispatched.route, Some(expected.as_str()));
                    }
                });
            }
        });
    }
}
