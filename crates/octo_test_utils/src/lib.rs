//! # OctoSpace Test Utilities
//!
//! Shared testing utilities:
//! - Determinism test harness
//! - Map and simulation fixtures
//! - Scripted agents
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod agents;
pub mod determinism;
pub mod fixtures;

/// Re-export proptest for convenience.
pub use proptest;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Install a `tracing` subscriber for tests.
///
/// Honours `RUST_LOG` (default `warn`) and writes through the test harness
/// capture. Safe to call from every test.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}
