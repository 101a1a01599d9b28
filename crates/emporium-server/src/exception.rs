//! Domain exception handlers.
//!
//! Handler code raises [`ApiError::Domain`] with a kind such as
//! `"UnicornException"`. If a handler is registered for that kind it decides
//! the response; otherwise the exception is an internal error.
//!
//! [`ApiError::Domain`]: emporium_core::ApiError::Domain

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use emporium_core::DomainException;

use crate::endpoint::Reply;

/// Renders one kind of domain exception.
pub type ExceptionHandlerFn = Arc<dyn Fn(&DomainException) -> Reply + Send + Sync>;

/// Exception handlers keyed by exception kind.
#[derive(Clone, Default)]
pub struct ExceptionHandlers {
    handlers: HashMap<String, ExceptionHandlerFn>,
}

impl ExceptionHandlers {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `kind`, replacing any earlier one.
    pub fn register<F>(&mut self, kind: impl Into<String>, handler: F)
    where
        F: Fn(&DomainException) -> Reply + Send + Sync + 'static,
    {
        self.handlers.insert(kind.into(), Arc::new(handler));
    }

    /// Returns true if `kind` has a handler.
    #[must_use]
    pub fn contains(&self, kind: &str) -> bool {
        self.handlers.contains_key(kind)
    }

    /// Returns the number of registered kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Renders `exception` with its registered handler, if any.
    #[must_use]
    pub fn handle(&self, exception: &DomainException) -> Option<Reply> {
        let handler = self.handlers.get(exception.kind())?;
        tracing::info!(
            kind = exception.kind(),
            subject = exception.subject(),
            "domain exception handled"
        );
        Some(handler(exception))
    }
}

impl fmt::Debug for ExceptionHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<&String> = self.handlers.keys().collect();
        kinds.sort();
        f.debug_struct("ExceptionHandlers")
            .field("kinds", &kinds)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use serde_json::json;

    fn registry() -> ExceptionHandlers {
        let mut handlers = ExceptionHandlers::new();
        handlers.register("UnicornException", |exc| {
            Reply::new(json!({ "message": format!("Oops! {} did something.", exc.subject()) }))
                .with_status(StatusCode::IM_A_TEAPOT)
        });
        handlers
    }

    #[test]
    fn test_registered_kind_is_rendered() {
        let handlers = registry();
        assert!(handlers.contains("UnicornException"));
        assert_eq!(handlers.len(), 1);

        let reply = handlers
            .handle(&DomainException::new("UnicornException", "yolo"))
            .unwrap();
        assert_eq!(reply.status(), Some(StatusCode::IM_A_TEAPOT));
        assert_eq!(reply.body()["message"], "Oops! yolo did something.");
    }

    #[test]
    fn test_unregistered_kind() {
        let handlers = registry();
        assert!(handlers
            .handle(&DomainException::new("DragonException", "smaug"))
            .is_none());
        assert!(ExceptionHandlers::new().is_empty());
    }

    #[test]
    fn test_debug_lists_kinds() {
        let debug = format!("{:?}", registry());
        assert!(debug.contains("UnicornException"));
    }
}
