//! Button-press routing.
//!
//! Routes are tried in registration order and the first matching route wins.
//! Overlapping matchers are allowed; later ones are simply shadowed.

use std::fmt;
use std::sync::Arc;

use regex::Regex;

use crate::handler::{BoxedHandler, Handler, into_handler};

/// Decides whether a route accepts a callback payload.
#[derive(Clone)]
pub enum CallbackMatcher {
    /// Payload starts with the prefix.
    Prefix(String),
    /// Regex matches at the start of the payload.
    Pattern(Regex),
    /// Custom check.
    Predicate(Arc<dyn Fn(&str) -> bool + Send + Sync>),
}

impl CallbackMatcher {
    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self::Prefix(prefix.into())
    }

    /// Compiles `pattern` into a [`CallbackMatcher::Pattern`].
    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(Self::Pattern)
    }

    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self::Predicate(Arc::new(f))
    }

    pub fn matches(&self, payload: &str) -> bool {
        match self {
            Self::Prefix(prefix) => payload.starts_with(prefix.as_str()),
            Self::Pattern(re) => re.find(payload).is_some_and(|m| m.start() == 0),
            Self::Predicate(f) => f(payload),
        }
    }
}

impl fmt::Debug for CallbackMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prefix(prefix) => f.debug_tuple("Prefix").field(prefix).finish(),
            Self::Pattern(re) => f.debug_tuple("Pattern").field(&re.as_str()).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl From<&str> for CallbackMatcher {
    fn from(prefix: &str) -> Self {
        Self::Prefix(prefix.to_string())
    }
}

impl From<String> for CallbackMatcher {
    fn from(prefix: String) -> Self {
        Self::Prefix(prefix)
    }
}

impl From<Regex> for CallbackMatcher {
    fn from(re: Regex) -> Self {
        Self::Pattern(re)
    }
}

/// A matcher paired with its handler.
#[derive(Clone)]
pub struct CallbackRoute {
    matcher: CallbackMatcher,
    handler: BoxedHandler,
}

impl CallbackRoute {
    pub fn matcher(&self) -> &CallbackMatcher {
        &self.matcher
    }

    pub fn handler(&self) -> &BoxedHandler {
        &self.handler
    }
}

impl fmt::Debug for CallbackRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackRoute")
            .field("matcher", &self.matcher)
            .finish_non_exhaustive()
    }
}

/// Ordered callback routes.
#[derive(Debug, Clone, Default)]
pub struct CallbackRouter {
    routes: Vec<CallbackRoute>,
}

impl CallbackRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a route.
    pub fn register<H, T>(&mut self, matcher: impl Into<CallbackMatcher>, handler: H)
    where
        H: Handler<T>,
        T: 'static,
    {
        self.register_boxed(matcher, into_handler(handler));
    }

    pub fn register_boxed(&mut self, matcher: impl Into<CallbackMatcher>, handler: BoxedHandler) {
        self.routes.push(CallbackRoute {
            matcher: matcher.into(),
            handler,
        });
    }

    /// Returns the first route whose matcher accepts `payload`.
    pub fn route(&self, payload: &str) -> Option<&CallbackRoute> {
        self.routes.iter().find(|route| route.matcher.matches(payload))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CallbackRoute> {
        self.routes.iter()
    }
}
