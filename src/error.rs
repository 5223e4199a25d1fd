//! Error types for guarded calls.

use thiserror::Error;

/// Error returned by a guarded call.
///
/// `CircuitOpen` is produced only by the guard itself, when a non-blocking
/// call hits a tripped breaker; it is never recorded as a fault. An error
/// from the protected work is carried through unchanged in `Service`.
#[derive(Debug, Error)]
pub enum BreakerError<E> {
    /// The breaker is open and the call was rejected without running.
    #[error("circuit breaker is open")]
    CircuitOpen,
    /// The protected work failed; the failure was recorded as a fault.
    #[error("protected call failed: {0}")]
    Service(E),
}

impl<E> BreakerError<E> {
    /// True if the call was rejected because the breaker is open.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::CircuitOpen)
    }

    /// The underlying service error, if any.
    pub fn into_service(self) -> Option<E> {
        match self {
            Self::CircuitOpen => None,
            Self::Service(err) => Some(err),
        }
    }
}
