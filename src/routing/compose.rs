//! Mounting a router inside another router.
//!
//! A [`SubRouter`] is both the predicate and the handler of one rule in the
//! parent. It matches when the path carries its prefix and the nested router
//! would select one of its own rules; handling dispatches into the nested
//! router with the request untouched (no prefix stripping).
//!
//! The nested router is evaluated twice per hit: a trial selection in the
//! predicate, then the real dispatch. Both are pure lookups over the same
//! immutable rules, so the second pass always agrees with the first.

use std::sync::Arc;

use crate::error::DispatchError;
use crate::routing::matcher::{Matcher, PathPrefixMatcher};
use crate::routing::request::RouteRequest;
use crate::routing::router::Router;
use crate::routing::rule::Handler;

/// A router mounted under a path prefix.
pub struct SubRouter<Req, Res, E> {
    prefix: PathPrefixMatcher,
    router: Arc<Router<Req, Res, E>>,
}

impl<Req, Res, E> SubRouter<Req, Res, E> {
    pub fn new(prefix: impl Into<String>, router: impl Into<Arc<Router<Req, Res, E>>>) -> Self {
        Self {
            prefix: PathPrefixMatcher::new(prefix),
            router: router.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        self.prefix.prefix()
    }

    pub fn router(&self) -> &Router<Req, Res, E> {
        &self.router
    }
}

impl<Req, Res, E> Clone for SubRouter<Req, Res, E> {
    fn clone(&self) -> Self {
        Self {
            prefix: self.prefix.clone(),
            router: Arc::clone(&self.router),
        }
    }
}

impl<Req: RouteRequest, Res, E> Matcher<Req> for SubRouter<Req, Res, E> {
    fn matches(&self, req: &Req) -> bool {
        // Prefix first: a miss must never touch the nested rules.
        self.prefix.matches(req) && self.router.select(req).is_some()
    }
}

impl<Req, Res, E> Handler<Req, Res, E> for SubRouter<Req, Res, E>
where
    Req: RouteRequest + 'static,
    Res: 'static,
    E: 'static,
{
    fn handle(&self, req: &Req) -> Result<Res, DispatchError<E>> {
        self.router.handle(req)
    }
}

impl<Req, Res, E> std::fmt::Debug for SubRouter<Req, Res, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubRouter")
            .field("prefix", &self.prefix())
            .field("router", &self.router)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use crate::http::{ProxyRequest, ProxyResponse};
    use crate::routing::rule::Rule;

    type TestRouter = Router<ProxyRequest, ProxyResponse, String>;

    #[test]
    fn test_sub_table_dispatches_through() {
        let mut sub = TestRouter::new();
        sub.register("inner", Rule::from_fn(|_| true, |_| Ok(ProxyResponse::text(200, "inner"))));

        let mut parent = TestRouter::new();
        parent.register_sub_table("outer", "/test", sub);

        let dispatched = parent.dispatch(&ProxyRequest::new("GET", "/test/test"));
        assert_eq!(dispatched.route, Some("outer"));
        assert_eq!(dispatched.result.unwrap().body, "inner");
    }

    #[test]
    fn test_empty_sub_table_never_matches() {
        let mut parent = TestRouter::new();
        parent.register_sub_table("outer", "/test", TestRouter::new());

        let dispatched = parent.dispatch(&ProxyRequest::new("GET", "/test/test"));
        assert!(dispatched.route.is_none());
        assert!(dispatched.result.unwrap_err().is_not_found());
    }

    #[test]
    fn test_sub_table_fallback_does_not_make_it_match() {
        let mut sub = TestRouter::new();
        sub.set_fallback(|_| Ok(ProxyResponse::text(200, "sub fallback")));

        let mut parent = TestRouter::new();
        parent
            .register_sub_table("outer", "/test", sub)
            .set_fallback(|_| Ok(ProxyResponse::text(404, "parent fallback")));

        let result = parent.handle(&ProxyRequest::new("GET", "/test/x")).unwrap();
        assert_eq!(result.body, "parent fallback");
    }

    #[test]
    fn test_prefix_miss_skips_sub_table() {
        let evaluations = Arc::new(AtomicUsize::new(0));
        let counter = evaluations.clone();

        let mut sub = TestRouter::new();
        sub.register(
            "inner",
            Rule::from_fn(
                move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    true
                },
                |_| Ok(ProxyResponse::default()),
            ),
        );

        let mut parent = TestRouter::new();
        parent.register_sub_table("outer", "/test", sub);

        let dispatched = parent.dispatch(&ProxyRequest::new("GET", "/other"));
        assert!(dispatched.result.unwrap_err().is_not_found());
        assert_eq!(evaluations.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_sub_table_sees_full_path() {
        let mut sub = TestRouter::new();
        sub.register_static("items", "GET", "/api/items", |req: &ProxyRequest| {
            Ok(ProxyResponse::text(200, req.path()))
        });

        let mut parent = TestRouter::new();
        parent.register_sub_table("api", "/api", sub);

        let result = parent.handle(&ProxyRequest::new("GET", "/api/items")).unwrap();
        assert_eq!(result.body, "/api/items");

        // The stripped path is not what the nested rules see.
        assert!(parent.handle(&ProxyRequest::new("GET", "/items")).unwrap_err().is_not_found());
    }

    #[test]
    fn test_nested_miss_falls_through_to_later_parent_rule() {
        let mut sub = TestRouter::new();
        sub.register_static("items", "GET", "/api/items", |_| Ok(ProxyResponse::text(200, "items")));

        let mut parent = TestRouter::new();
        parent
            .register_sub_table("api", "/api", sub)
            .register(
                "catch-all",
                Rule::from_fn(|_| true, |_| Ok(ProxyResponse::text(200, "catch-all"))),
            );

        let hit = parent.dispatch(&ProxyRequest::new("GET", "/api/items"));
        assert_eq!(hit.route, Some("api"));

        let miss = parent.dispatch(&ProxyRequest::new("POST", "/api/items"));
        assert_eq!(miss.route, Some("catch-all"));
        assert_eq!(miss.result.unwrap().body, "catch-all");
    }

    #[test]
    fn test_shared_sub_table_records_its_own_last_match() {
        let mut sub = TestRouter::new();
        sub.register_static("inner", "GET", "/v1/ping", |_| Ok(ProxyResponse::text(200, "pong")));
        let sub = Arc::new(sub);

        let mut parent = TestRouter::new();
        parent.register_sub_table("v1", "/v1", Arc::clone(&sub));

        parent.handle(&ProxyRequest::new("GET", "/v1/ping")).unwrap();
        assert_eq!(parent.last_matched().as_deref().map(String::as_str), Some("v1"));
        assert_eq!(sub.last_matched().as_deref().map(String::as_str), Some("inner"));
    }
}
