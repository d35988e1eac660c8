//! # cascade-search
//!
//! Sequential fallback dispatch across pluggable search backends.
//!
//! The dispatcher fronts an ordered chain of search backends. Each incoming
//! query is offered to the backends one at a time, in chain order; the first
//! backend whose result carries at least one match wins, and later entries
//! are never consulted. When every entry comes up empty the caller receives
//! a well-formed null-object result instead of an error.
//!
//! ## Design
//!
//! - The chain is a comma-separated list of backend identifiers, parsed once
//!   at initialisation and immutable afterwards
//! - Backends are resolved per query through an injected [`BackendResolver`];
//!   identifiers that resolve to nothing, or to a handler that is not
//!   query-capable, are skipped silently
//! - Every attempt runs inside a private execution context: the backend owns
//!   a deep copy of the query parameters and writes into a response
//!   pre-populated only with the outer header, so it can neither mutate the
//!   original query nor observe unrelated state
//! - Partial results are never merged across backends: exactly one
//!   backend's result (or the empty result) reaches the caller
//! - A backend error aborts the whole dispatch; "returned empty" and
//!   "failed" are never conflated
//!
//! ## Example
//!
//! ```
//! use std::collections::HashMap;
//!
//! use cascade_search::{
//!     match_count, BackendResolver, Chain, Dispatcher, QueryParams, QueryRequest,
//!     QueryResponse, ResolvedBackend, SearcherHandle,
//! };
//!
//! /// A resolver backed by the hosting system's handler table.
//! struct Registry(HashMap<String, ResolvedBackend>);
//!
//! impl BackendResolver for Registry {
//!     fn resolve(&self, _request: &QueryRequest, name: &str) -> Option<ResolvedBackend> {
//!         self.0.get(name).cloned()
//!     }
//! }
//!
//! # async fn example() -> cascade_search::Result<()> {
//! let dispatcher = Dispatcher::new(
//!     Chain::parse("/memory,/disk"),
//!     Registry(HashMap::new()),
//! );
//!
//! let request = QueryRequest::new(
//!     QueryParams::from_iter([("q", "wild flowers")]),
//!     SearcherHandle::new(()),
//! );
//! let mut response = QueryResponse::new();
//!
//! dispatcher.dispatch(&request, &mut response).await?;
//!
//! // Nothing registered, so the chain fell through to the empty result.
//! assert_eq!(match_count(response.values()), 0);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dispatch;
pub mod error;
pub mod handler;
pub mod request;
pub mod response;
pub mod types;

pub use config::{Chain, ChainConfig, CHAIN_KEY};
pub use dispatch::Dispatcher;
pub use error::{BoxError, DispatchError, Result};
pub use handler::{BackendResolver, QueryBackend, ResolvedBackend};
pub use request::{QueryParams, QueryRequest, RequestTimer, SearcherHandle};
pub use response::{
    empty_result, match_count, QueryResponse, ResponseHeader, ResponseValue, ResponseValues,
    RESPONSE_HEADER_KEY, RESPONSE_KEY,
};
pub use types::{DocList, DocTransformer, ResultContext, ReturnFields};
