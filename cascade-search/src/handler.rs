//! Backend capability contracts: query handling and identifier resolution.
//!
//! The hosting system registers handlers of many kinds under string
//! identifiers (search, administrative, maintenance). Only query-capable
//! handlers participate in dispatch; everything else is recognised through
//! the closed [`ResolvedBackend`] variant set and skipped deterministically.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::BoxError;
use crate::request::QueryRequest;
use crate::response::QueryResponse;

/// A query-capable search backend.
///
/// `handle` receives the request half of a per-attempt execution context by
/// value, owning a private copy of the query parameters outright, and
/// populates the response it is given. The dispatcher reads the response's
/// full value mapping back as the candidate result.
///
/// Implementations must be safe for concurrent use across simultaneous
/// top-level queries; the dispatcher itself holds no request-scoped state.
#[async_trait]
pub trait QueryBackend: Send + Sync {
    /// Execute the query and populate `response`.
    ///
    /// # Errors
    ///
    /// An error here is a genuine execution failure, not an empty result.
    /// It aborts the whole dispatch and surfaces to the caller.
    async fn handle(
        &self,
        request: QueryRequest,
        response: &mut QueryResponse,
    ) -> Result<(), BoxError>;
}

/// A handler resolved from the hosting registry.
///
/// Closed set: either query-capable and eligible for dispatch, or some other
/// handler kind the dispatcher must skip. Skipping is policy, not an error.
#[derive(Clone)]
pub enum ResolvedBackend {
    /// A search handler; participates in dispatch.
    Query(Arc<dyn QueryBackend>),
    /// Registered under the identifier, but not a search handler
    /// (administrative, update, ping). Never invoked by dispatch.
    Other,
}

impl ResolvedBackend {
    /// Whether this handler participates in dispatch.
    pub fn is_query(&self) -> bool {
        matches!(self, Self::Query(_))
    }
}

impl fmt::Debug for ResolvedBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Query(_) => f.write_str("ResolvedBackend::Query(..)"),
            Self::Other => f.write_str("ResolvedBackend::Other"),
        }
    }
}

/// Maps a chain identifier to the handler registered under it.
///
/// Injected into the dispatcher at construction, never looked up through
/// ambient global state, so the dispatcher stays unit-testable without a
/// live hosting runtime. Implementations typically front the host's handler
/// registry and may consult the request's session when registration is
/// per-session. Must be safe for concurrent use.
pub trait BackendResolver: Send + Sync {
    /// Resolve `name` for the given request, or `None` if nothing is
    /// registered under it.
    fn resolve(&self, request: &QueryRequest, name: &str) -> Option<ResolvedBackend>;
}

impl<R: BackendResolver + ?Sized> BackendResolver for Arc<R> {
    fn resolve(&self, request: &QueryRequest, name: &str) -> Option<ResolvedBackend> {
        (**self).resolve(request, name)
    }
}
