//! Breaker registry.
//!
//! # Responsibilities
//! - Map breaker names to shared `CircuitBreaker` instances
//! - Create breakers lazily with the registry's default configuration
//! - Own every breaker for the registry's lifetime
//!
//! # Design Decisions
//! - An explicit object passed by reference; no process-global registry
//! - Entries are never evicted
//! - DashMap's entry API makes concurrent first lookups atomic

use std::sync::Arc;

use dashmap::DashMap;

use crate::breaker::CircuitBreaker;
use crate::config::BreakerConfig;

/// Named collection of circuit breakers with lazy creation.
///
/// Independent call sites share a breaker by resolving the same name; the
/// registry hands out `Arc` references and keeps the instances alive.
#[derive(Debug, Default)]
pub struct BreakerRegistry {
    defaults: BreakerConfig,
    breakers: DashMap<String, Arc<CircuitBreaker>>,
}

impl BreakerRegistry {
    /// Registry whose breakers use the default configuration
    /// (threshold 5, 60s cooldown).
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry whose lazily created breakers use `defaults`.
    pub fn with_defaults(defaults: BreakerConfig) -> Self {
        Self {
            defaults,
            breakers: DashMap::new(),
        }
    }

    /// Look up the breaker for `name`, creating it on first access.
    pub fn resolve(&self, name: &str) -> Arc<CircuitBreaker> {
        self.breakers
            .entry(name.to_string())
            .or_insert_with(|| {
                tracing::debug!(%name, "creating circuit breaker");
                Arc::new(CircuitBreaker::new(
                    self.defaults.reset(),
                    self.defaults.threshold,
                ))
            })
            .clone()
    }

    /// Register a specifically configured breaker under `name`, replacing
    /// any existing entry.
    pub fn install(&self, name: &str, breaker: CircuitBreaker) -> Arc<CircuitBreaker> {
        let breaker = Arc::new(breaker);
        self.breakers.insert(name.to_string(), Arc::clone(&breaker));
        breaker
    }

    /// Number of breakers currently registered.
    pub fn len(&self) -> usize {
        self.breakers.len()
    }

    /// True if no breaker has been resolved or installed yet.
    pub fn is_empty(&self) -> bool {
        self.breakers.is_empty()
    }
}
