//! The chain-execution algorithm: sequential fallback across backends.
//!
//! Entries are tried strictly one at a time, in chain order, each inside a
//! private execution context. The first candidate result with a positive
//! match count wins and ends the chain; if nothing matches, the caller gets
//! the null-object empty result. A backend error is the one thing that is
//! never absorbed; it aborts dispatch immediately.

use std::fmt;

use crate::config::Chain;
use crate::error::{DispatchError, Result};
use crate::handler::{BackendResolver, QueryBackend, ResolvedBackend};
use crate::request::{QueryRequest, RequestTimer};
use crate::response::{
    empty_result, match_count, QueryResponse, ResponseValue, ResponseValues, RESPONSE_KEY,
};

/// Sequential fallback dispatcher over an ordered backend chain.
///
/// Holds the immutable chain and the injected resolver, and nothing else:
/// all request-scoped state lives in per-attempt execution contexts, so one
/// dispatcher instance can serve concurrent top-level queries as long as the
/// resolver and its backends can.
pub struct Dispatcher<R> {
    chain: Chain,
    resolver: R,
}

impl<R> fmt::Debug for Dispatcher<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("chain", &self.chain)
            .finish_non_exhaustive()
    }
}

impl<R: BackendResolver> Dispatcher<R> {
    /// Build a dispatcher from its chain and backend resolver.
    pub fn new(chain: Chain, resolver: R) -> Self {
        tracing::debug!(entries = chain.len(), "dispatcher initialised");
        Self { chain, resolver }
    }

    /// The configured chain.
    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    /// Dispatch one query down the chain and write the outcome into
    /// `response`.
    ///
    /// Chain entries are resolved in order; unregistered identifiers and
    /// non-query handlers are skipped. Each query-capable backend runs
    /// inside a fresh execution context (a deep copy of the parameters and
    /// a response carrying only the outer header) and is invoked at most
    /// once. The first candidate whose match count is greater than zero
    /// becomes the outcome and later entries are never evaluated. If no
    /// candidate qualifies, the outcome is the empty result.
    ///
    /// The outcome's entries are written into `response`'s value set,
    /// replacing by key; it fully determines the `response` and
    /// `responseHeader` entries the caller sees.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Backend`] if a backend's handle operation
    /// fails. Nothing is written into `response` in that case, and the
    /// remaining chain entries are not tried.
    pub async fn dispatch(
        &self,
        request: &QueryRequest,
        response: &mut QueryResponse,
    ) -> Result<()> {
        let mut outcome: Option<ResponseValues> = None;

        for name in self.chain.iter() {
            let backend = match self.resolver.resolve(request, name) {
                Some(ResolvedBackend::Query(backend)) => backend,
                Some(ResolvedBackend::Other) => {
                    tracing::debug!(backend = name, "not query-capable, skipping");
                    continue;
                }
                None => {
                    tracing::debug!(backend = name, "not registered, skipping");
                    continue;
                }
            };

            let attempt = RequestTimer::start();
            let candidate = execute(backend.as_ref(), name, request, response).await?;
            let found = match_count(&candidate);
            tracing::debug!(
                backend = name,
                found,
                elapsed_ms = attempt.elapsed().as_millis() as u64,
                "backend executed"
            );

            if found > 0 {
                outcome = Some(candidate);
                break;
            }

            // A missing or unusable response entry also counts as zero
            // matches, which can mask a backend-side bug.
            match candidate.get(RESPONSE_KEY) {
                Some(ResponseValue::Results(_)) => {}
                _ => tracing::warn!(
                    backend = name,
                    "result has no usable response entry, counted as zero matches"
                ),
            }
        }

        let outcome =
            outcome.unwrap_or_else(|| empty_result(request, response.return_fields()));
        response.set_all(outcome);
        Ok(())
    }
}

/// Run one backend inside a private execution context and read back its full
/// value mapping as the candidate result.
async fn execute(
    backend: &dyn QueryBackend,
    name: &str,
    request: &QueryRequest,
    outer: &QueryResponse,
) -> Result<ResponseValues> {
    let scoped_request = request.scoped();
    let mut scoped_response = outer.scoped();

    backend
        .handle(scoped_request, &mut scoped_response)
        .await
        .map_err(|source| DispatchError::Backend {
            backend: name.to_owned(),
            source,
        })?;

    Ok(scoped_response.into_values())
}
