//! A rule pairs a predicate with the handler it guards.

use std::marker::PhantomData;

use crate::error::DispatchError;
use crate::routing::matcher::{self, Matcher};

/// Handles a request once its rule has matched.
pub trait Handler<Req, Res, E>: Send + Sync {
    fn handle(&self, req: &Req) -> Result<Res, DispatchError<E>>;
}

/// Adapts a `Fn(&Req) -> Result<Res, E>` closure into a [`Handler`].
///
/// The closure's error is wrapped as [`DispatchError::Handler`] and otherwise
/// left alone.
pub struct FnHandler<F, Req> {
    f: F,
    _req: PhantomData<fn(&Req)>,
}

impl<F, Req> FnHandler<F, Req> {
    pub fn new(f: F) -> Self {
        Self {
            f,
            _req: PhantomData,
        }
    }
}

impl<F, Req, Res, E> Handler<Req, Res, E> for FnHandler<F, Req>
where
    F: Fn(&Req) -> Result<Res, E> + Send + Sync,
{
    fn handle(&self, req: &Req) -> Result<Res, DispatchError<E>> {
        (self.f)(req).map_err(DispatchError::Handler)
    }
}

/// One route: a predicate and a handler.
///
/// Rules are immutable once built. To change a route, register a new rule
/// under the same name.
pub struct Rule<Req, Res, E> {
    matcher: Box<dyn Matcher<Req>>,
    handler: Box<dyn Handler<Req, Res, E>>,
}

impl<Req: 'static, Res: 'static, E: 'static> Rule<Req, Res, E> {
    /// Build a rule from any matcher and a handler closure.
    pub fn new<M, F>(matcher: M, handler: F) -> Self
    where
        M: Matcher<Req> + 'static,
        F: Fn(&Req) -> Result<Res, E> + Send + Sync + 'static,
    {
        Self::from_parts(matcher, FnHandler::new(handler))
    }

    /// Build a rule from a predicate closure and a handler closure.
    pub fn from_fn<P, F>(predicate: P, handler: F) -> Self
    where
        P: Fn(&Req) -> bool + Send + Sync + 'static,
        F: Fn(&Req) -> Result<Res, E> + Send + Sync + 'static,
    {
        Self::new(matcher::from_fn::<Req, P>(predicate), handler)
    }

    /// Build a rule from a matcher and a handler implementation.
    pub fn from_parts<M, H>(matcher: M, handler: H) -> Self
    where
        M: Matcher<Req> + 'static,
        H: Handler<Req, Res, E> + 'static,
    {
        Self {
            matcher: Box::new(matcher),
            handler: Box::new(handler),
        }
    }
}

impl<Req, Res, E> Rule<Req, Res, E> {
    pub fn matches(&self, req: &Req) -> bool {
        self.matcher.matches(req)
    }

    pub fn handle(&self, req: &Req) -> Result<Res, DispatchError<E>> {
        self.handler.handle(req)
    }
}

impl<Req, Res, E> std::fmt::Debug for Rule<Req, Res, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule").finish_non_exhaustive()
    }
}
