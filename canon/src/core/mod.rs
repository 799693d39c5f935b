//! Deterministic, pure logic shared by canon.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! value trees and return deterministic outputs suitable for tests.

pub mod canonical;
pub mod error;
pub mod external;
pub mod path;
pub mod serialize;
pub mod text;
pub mod value;
pub mod walk;
