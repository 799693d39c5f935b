//! I/O helpers for canon commands.

pub mod config;
pub mod ref_schema;
pub mod tree_store;
