//! Stable exit codes for canon CLI commands.

/// Command succeeded.
pub const OK: i32 = 0;
/// Command failed due to invalid input/config or other errors.
pub const INVALID: i32 = 1;
/// One or more external references failed validation.
pub const BAD_REFERENCE: i32 = 2;
