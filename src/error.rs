//! Error types for the slotline CLI.
//!
//! Uses thiserror for derive macros and provides user-actionable error messages.

use crate::exit_codes;
use thiserror::Error;

/// Main error type for slotline operations.
///
/// Each variant maps to a specific exit code. `NotFound` is the
/// 404-equivalent surfaced for unknown task or slot ids; everything the user
/// can fix themselves (bad dates, inverted ranges, bad arguments) is a
/// `UserError`.
#[derive(Error, Debug)]
pub enum SlotlineError {
    /// Referenced task or slot id does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// User provided invalid arguments or an invalid date range.
    #[error("{0}")]
    UserError(String),

    /// The slot store or another state file could not be read or written.
    #[error("Storage failure: {0}")]
    StorageError(String),

    /// Lock could not be acquired.
    #[error("Lock acquisition failed: {0}")]
    LockError(String),
}

impl SlotlineError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            SlotlineError::NotFound(_) => exit_codes::NOT_FOUND,
            SlotlineError::UserError(_) => exit_codes::USER_ERROR,
            SlotlineError::StorageError(_) => exit_codes::STORAGE_FAILURE,
            SlotlineError::LockError(_) => exit_codes::LOCK_FAILURE,
        }
    }
}

/// Result type alias for slotline operations.
pub type Result<T> = std::result::Result<T, SlotlineError>;
