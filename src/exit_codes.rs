//! Exit code constants for the slotline CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, invalid range, malformed dates)
//! - 2: Not found (unknown task or slot id)
//! - 3: Storage failure (state file read/write/parse errors)
//! - 4: Lock acquisition failure

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, invalid date range, or malformed input.
pub const USER_ERROR: i32 = 1;

/// Not found: referenced task or slot id does not exist.
pub const NOT_FOUND: i32 = 2;

/// Storage failure: the slot store could not be read or written.
pub const STORAGE_FAILURE: i32 = 3;

/// Lock acquisition failure: store or task lock could not be acquired.
pub const LOCK_FAILURE: i32 = 4;
