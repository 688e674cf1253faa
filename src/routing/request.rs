//! The view of a request the routing engine needs.

/// Read-only access to the fields rules match on.
///
/// The engine never inspects anything else on a request, so any event or
/// HTTP type can be routed once it exposes a path and a method.
pub trait RouteRequest {
    /// Request path, e.g. `/users/42`.
    fn path(&self) -> &str;

    /// Request method, e.g. `GET`. Compared case-sensitively.
    fn method(&self) -> &str;
}

impl<T: RouteRequest + ?Sized> RouteRequest for &T {
    fn path(&self) -> &str {
        (**self).path()
    }

    fn method(&self) -> &str {
        (**self).method()
    }
}

impl<B> RouteRequest for axum::http::Request<B> {
    fn path(&self) -> &str {
        self.uri().path()
    }

    fn method(&self) -> &str {
        self.method().as_str()
    }
}
