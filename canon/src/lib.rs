//! Canonical, JSON-safe serialization of test-result trees.
//!
//! Result trees mix plain data with external reference markers: small
//! mappings pointing at files, sandbox resources, pending uploads or remote
//! urls instead of carrying the data inline. This crate walks such trees,
//! keeps references opaque, and produces a deterministic JSON form.
//!
//! - **[`core`]**: Pure, deterministic logic (value model, walker, serializer,
//!   reference model). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (config file, tree files, schema
//!   checks).
//!
//! Orchestration modules ([`canonicalize`], [`refs`]) combine core logic with
//! I/O to implement CLI commands.

pub mod canonicalize;
pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod refs;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
