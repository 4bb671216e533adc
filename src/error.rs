//! Error taxonomy for stub resolution and response delivery.

/// Failure outcome of resolving or answering a request.
///
/// Condition evaluation never produces one of these; they only appear at the
/// resolve boundary and from response factories.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StubError {
    /// A stub matched but was never given a response.
    #[error("stub matched but no response was configured")]
    Unimplemented,

    /// No registered stub matched the request.
    #[error("no stub matched request: {method} {url}")]
    UnhandledRequest { method: String, url: String },

    /// The request could not be decomposed for a comparison.
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// A simulated network error.
    #[error("transport failure: {0}")]
    TransportFailure(String),
}

impl StubError {
    /// Build a simulated network error.
    pub fn transport(detail: impl Into<String>) -> Self {
        StubError::TransportFailure(detail.into())
    }

    /// Whether this error means no stub claimed the request.
    pub fn is_unhandled(&self) -> bool {
        matches!(self, StubError::UnhandledRequest { .. })
    }
}
