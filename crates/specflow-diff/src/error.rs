//! Error types for the diff engine.

use thiserror::Error;

/// Errors from replaying an edit script against an input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiffError {
    #[error("edit script does not match the input at byte {offset}")]
    Mismatch { offset: usize },

    #[error("edit script consumed {consumed} of {len} input bytes")]
    Incomplete { consumed: usize, len: usize },
}
