//! Query request model: named parameters, session handle, timing scope.
//!
//! A [`QueryRequest`] is read-only from the dispatcher's perspective. Each
//! dispatch attempt gets its own [`QueryRequest::scoped`] copy, with
//! deep-copied parameters and a fresh timer, which it owns outright, so a
//! backend can never mutate the original query.

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Named query parameters. Keys are unique; insertion order is preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryParams(IndexMap<String, String>);

impl QueryParams {
    /// Create an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter, replacing any existing value under the same key.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Look up a parameter value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no parameters are set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Shared handle to the searcher/session resource a query executes against.
///
/// Owned by the hosting runtime. The dispatcher never looks inside; it only
/// threads the handle into per-attempt requests and into result contexts so
/// documents can be materialised later. Backends downcast to the concrete
/// type they were registered with.
#[derive(Clone)]
pub struct SearcherHandle(Arc<dyn Any + Send + Sync>);

impl SearcherHandle {
    /// Wrap a host-owned searcher/session value.
    pub fn new<T: Any + Send + Sync>(searcher: T) -> Self {
        Self(Arc::new(searcher))
    }

    /// Borrow the underlying value as `T`, if that is what was wrapped.
    pub fn downcast_ref<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }

    /// Whether two handles point at the same underlying resource.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for SearcherHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SearcherHandle(..)")
    }
}

/// Timing scope, created fresh for every request and dispatch attempt.
#[derive(Debug, Clone, Copy)]
pub struct RequestTimer {
    started: Instant,
}

impl RequestTimer {
    /// Start a new timing scope.
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    /// Time elapsed since this scope started.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

impl Default for RequestTimer {
    fn default() -> Self {
        Self::start()
    }
}

/// An incoming query: named parameters plus the session it runs against.
#[derive(Debug, Clone)]
pub struct QueryRequest {
    params: QueryParams,
    searcher: SearcherHandle,
    timer: RequestTimer,
}

impl QueryRequest {
    /// Build a request from its parameters and session handle.
    pub fn new(params: QueryParams, searcher: SearcherHandle) -> Self {
        Self {
            params,
            searcher,
            timer: RequestTimer::start(),
        }
    }

    /// The query parameters.
    pub fn params(&self) -> &QueryParams {
        &self.params
    }

    /// Mutable access to the parameters.
    ///
    /// Intended for the owner of a request, typically a backend adjusting
    /// its private [`scoped`](Self::scoped) copy.
    pub fn params_mut(&mut self) -> &mut QueryParams {
        &mut self.params
    }

    /// The searcher/session handle this query executes against.
    pub fn searcher(&self) -> &SearcherHandle {
        &self.searcher
    }

    /// The timing scope attached to this request.
    pub fn timer(&self) -> &RequestTimer {
        &self.timer
    }

    /// Build the request half of a per-attempt execution context: a deep
    /// copy of the parameters, the same underlying searcher, a fresh timer.
    pub fn scoped(&self) -> QueryRequest {
        QueryRequest {
            params: self.params.clone(),
            searcher: self.searcher.clone(),
            timer: RequestTimer::start(),
        }
    }
}
