//! Dispatch engine error types

use thiserror::Error;

/// Failures surfaced by the dispatch engine and its body accessors.
///
/// A handler error propagates unmodified out of `Router::handle`; the
/// hosting runtime decides the externally visible behavior. The engine
/// itself performs no retries.
#[derive(Debug, Error)]
pub enum RouterError {
    /// The underlying body stream could not be read.
    #[error("failed to read request body: {0}")]
    BodyRead(#[from] hyper::Error),

    /// The body stream was already taken by a failed read attempt.
    #[error("request body already consumed")]
    BodyConsumed,

    /// The body is not the requested JSON representation.
    #[error("invalid JSON body: {0}")]
    Json(#[from] serde_json::Error),

    /// A collaborator invoked by a handler failed.
    #[error(transparent)]
    Fault(Box<dyn std::error::Error + Send + Sync>),
}

impl RouterError {
    /// Wrap a collaborator failure so it propagates as a handler fault.
    pub fn fault<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Fault(Box::new(err))
    }
}
