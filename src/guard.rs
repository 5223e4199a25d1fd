//! Scoped execution guard.
//!
//! # Responsibilities
//! - Resolve the named breaker before running caller work
//! - Reject or suspend when the breaker is open
//! - Report the outcome back to the breaker: success clears, failure faults
//!
//! # Design Decisions
//! - Any error from the work counts as a fault, regardless of kind
//! - The guard's own open-rejection is never recorded as a fault
//! - A waiter released from a blocking call runs the work without re-checking
//!   trip state; a racing re-trip does not stop it

use std::future::Future;

use crate::error::BreakerError;
use crate::registry::BreakerRegistry;

impl BreakerRegistry {
    /// Run `work` under the breaker named `name`.
    ///
    /// With `block == false` a tripped breaker rejects the call immediately
    /// with [`BreakerError::CircuitOpen`], leaving breaker state untouched.
    /// With `block == true` the caller suspends until the breaker reopens;
    /// bound the wait externally with `tokio::time::timeout` if needed.
    ///
    /// On success the breaker is fully cleared and the value returned; on
    /// failure a fault is registered and the work's own error is returned
    /// unchanged.
    pub async fn run<F, T, E>(
        &self,
        name: &str,
        block: bool,
        work: F,
    ) -> Result<T, BreakerError<E>>
    where
        F: Future<Output = Result<T, E>>,
    {
        let breaker = self.resolve(name);
        if breaker.tripped() {
            if block {
                breaker.wait().await;
            } else {
                tracing::debug!(%name, "rejecting call, circuit breaker open");
                return Err(BreakerError::CircuitOpen);
            }
        }
        match work.await {
            Ok(value) => {
                breaker.clear();
                Ok(value)
            }
            Err(err) => {
                breaker.fault();
                Err(BreakerError::Service(err))
            }
        }
    }
}
