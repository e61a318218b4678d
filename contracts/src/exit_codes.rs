//! Stable exit codes for contracts CLI commands.

/// Command succeeded and every declaration was accepted.
pub const OK: i32 = 0;
/// Command failed due to an unreadable or invalid manifest/config or other errors.
pub const INVALID: i32 = 1;
/// `contracts check` rejected at least one implementation.
pub const REJECTED: i32 = 2;
