//! Diagnostics for the `canon` binary.
//!
//! stdout carries nothing but canonical JSON, reference lines and new
//! markers, so it can be piped into other tools. Everything else goes to
//! stderr: the `tracing` events emitted while walking and checking trees, and
//! the error chain `main` prints before exiting with a non-zero code.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the stderr subscriber, filtered by `RUST_LOG` (default `warn`).
///
/// `RUST_LOG=canon=trace` logs every reference node the walker meets;
/// `canon=debug` logs reference counts and check results.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
