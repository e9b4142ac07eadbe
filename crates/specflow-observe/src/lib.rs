//! Read-only views over Specflow specs.
//!
//! Each view projects a spec (and, for the compare view, a precomputed
//! comparison) into terminal text and a JSON document. Views never mutate
//! the spec.

pub mod approvals;
pub mod compare;
pub mod error;
pub mod format;
pub mod history;
pub mod journal;
pub mod stories;
pub mod summary;
pub mod view;

pub use approvals::ApprovalsView;
pub use compare::CompareView;
pub use error::ObserveError;
pub use format::{bar_chart, format_date, format_points, inline_diff, side_by_side, truncate, wrap};
pub use history::HistoryView;
pub use journal::JournalView;
pub use stories::StoriesView;
pub use summary::SummaryView;
pub use view::{
    available_views, view_for, DiffLayout, RenderContext, View, ViewFormat, ViewKind, ViewOutput,
};
