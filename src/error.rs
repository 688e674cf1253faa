//! Dispatch outcome errors.

use std::fmt;

/// Boxed error used by handlers built from configuration.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors surfaced by [`Router::dispatch`](crate::routing::Router::dispatch).
///
/// `NotFound` is an ordinary routing miss. `Handler` carries whatever the
/// selected handler returned, untouched.
#[derive(Debug)]
pub enum DispatchError<E> {
    /// No rule matched and no fallback is configured.
    NotFound,

    /// The matched rule (or the fallback) returned an error.
    Handler(E),
}

impl<E> DispatchError<E> {
    /// Returns true for a routing miss.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DispatchError::NotFound)
    }

    /// Take the handler error by value, if any.
    pub fn into_handler_error(self) -> Option<E> {
        match self {
            DispatchError::Handler(e) => Some(e),
            DispatchError::NotFound => None,
        }
    }
}

impl<E> From<E> for DispatchError<E> {
    fn from(e: E) -> Self {
        DispatchError::Handler(e)
    }
}

impl<E: fmt::Display> fmt::Display for DispatchError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::NotFound => write!(f, "Not found"),
            DispatchError::Handler(e) => e.fmt(f),
        }
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for DispatchError<E> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err: DispatchError<String> = DispatchError::NotFound;
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Not found");
    }

    #[test]
    fn test_handler_error_is_transparent() {
        let err = DispatchError::Handler("backend exploded".to_string());
        assert!(!err.is_not_found());
        assert_eq!(err.to_string(), "backend exploded");
        assert_eq!(err.into_handler_error().as_deref(), Some("backend exploded"));
    }
}
