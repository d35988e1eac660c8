//! Error types for the cascade-search crate.
//!
//! The dispatcher resolves almost everything locally: an empty chain, an
//! unregistered identifier, a non-search handler, or a result without a
//! usable response entry are all policy cases, not errors. The only error
//! that surfaces is a genuine backend execution failure.

/// Boxed error surfaced by a host-provided backend's handle operation.
///
/// Backends live outside this crate, so their error types cannot be
/// enumerated here.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur during chain dispatch.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// A backend's handle operation failed. Dispatch stops at that entry;
    /// no empty-result fallback is substituted and later entries never run.
    #[error("backend '{backend}' failed: {source}")]
    Backend {
        /// Chain identifier of the failing backend.
        backend: String,
        /// The backend's own error, unmodified.
        #[source]
        source: BoxError,
    },
}

/// Convenience type alias for cascade-search results.
pub type Result<T> = std::result::Result<T, DispatchError>;
