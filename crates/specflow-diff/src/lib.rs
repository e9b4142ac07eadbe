//! Diff engine for Specflow.
//!
//! Two independent, pure algorithms:
//!
//! - [`diff_keyed`] compares two ordered collections of records that carry a
//!   stable key (user stories by id) and reports which keys were added,
//!   removed, or modified.
//! - [`diff_text`] computes a minimal, deterministic edit script between two
//!   strings using Myers' O(ND) algorithm, at line or word granularity.
//!
//! Neither algorithm keeps state between calls. Callers decide what, if
//! anything, to persist from the results.

pub mod error;
pub mod keyed;
mod myers;
pub mod text;

pub use error::DiffError;
pub use keyed::{diff_keyed, ChangeKind, Keyed, KeyedChange};
pub use text::{diff_lines, diff_text, diff_words, DiffOp, DiffStats, EditScript, Granularity, OpKind};
