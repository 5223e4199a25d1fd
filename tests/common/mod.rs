//! Shared utilities for integration testing.

use std::io;

/// Install a subscriber so `RUST_LOG=debug cargo test` shows breaker
/// transitions. Safe to call from every test; only the first call wins.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// The failure used to fault breakers in tests.
#[allow(dead_code)]
pub fn backend_down() -> io::Error {
    io::Error::new(io::ErrorKind::ConnectionRefused, "backend down")
}
