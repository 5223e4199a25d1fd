//! Named, shared circuit breakers for Tokio tasks.
//!
//! # Data Flow
//! ```text
//! Caller:
//!     registry.run(name, block, work)
//!     → registry.rs (resolve or lazily create the named breaker)
//!     → guard.rs (tripped? reject with CircuitOpen, or wait for reopen)
//!     → caller's work runs
//!     → success: breaker.clear()  /  failure: breaker.fault()
//!
//! Breaker (breaker.rs):
//!     fails >= threshold → trip, block callers, spawn recovery timer
//!     timer fires after reset_delay → reopen one failure short of the
//!     threshold, wake all waiters
//! ```
//!
//! # Design Decisions
//! - Breakers are shared by name through an explicit registry; no globals
//! - Recovery is a partial reset: one renewed failure re-trips immediately,
//!   keeping retry pressure off a still-unhealthy dependency
//! - Waiting is unbounded; callers layer their own deadlines on top

pub mod breaker;
pub mod config;
pub mod error;
mod guard;
pub mod registry;

pub use breaker::CircuitBreaker;
pub use config::BreakerConfig;
pub use error::BreakerError;
pub use registry::BreakerRegistry;
