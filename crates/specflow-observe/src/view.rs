//! View trait and core abstractions for spec rendering.

use serde_json::Value;

use specflow_lifecycle::{Spec, VersionComparison};

use crate::error::ObserveError;

/// The kind of view to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Summary,
    Stories,
    History,
    Approvals,
    Compare,
    Journal,
}

impl ViewKind {
    /// Parse a view kind from a string.
    pub fn parse(s: &str) -> Result<Self, ObserveError> {
        match s {
            "summary" | "overview" => Ok(ViewKind::Summary),
            "stories" | "user-stories" => Ok(ViewKind::Stories),
            "history" | "versions" => Ok(ViewKind::History),
            "approvals" | "approvers" => Ok(ViewKind::Approvals),
            "compare" | "diff" => Ok(ViewKind::Compare),
            "journal" | "activity" => Ok(ViewKind::Journal),
            _ => Err(ObserveError::UnknownView {
                name: s.to_string(),
            }),
        }
    }

    /// Display name for this view kind.
    pub fn name(&self) -> &'static str {
        match self {
            ViewKind::Summary => "summary",
            ViewKind::Stories => "stories",
            ViewKind::History => "history",
            ViewKind::Approvals => "approvals",
            ViewKind::Compare => "compare",
            ViewKind::Journal => "journal",
        }
    }
}

/// The output format for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewFormat {
    Text,
    Json,
}

impl ViewFormat {
    /// Parse a view format from a string.
    pub fn parse(s: &str) -> Self {
        match s {
            "json" => ViewFormat::Json,
            _ => ViewFormat::Text,
        }
    }
}

/// How text differences are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiffLayout {
    /// Old and new in two columns.
    #[default]
    SideBySide,
    /// One column with `[-deleted-]` and `{+inserted+}` markers.
    Inline,
}

/// The output of a view render.
#[derive(Debug)]
pub struct ViewOutput {
    /// Terminal-friendly text rendering.
    pub text: String,
    /// Machine-readable JSON (always populated).
    pub data: Value,
}

impl ViewOutput {
    /// Render in the requested format.
    pub fn render(&self, format: ViewFormat) -> String {
        match format {
            ViewFormat::Text => self.text.clone(),
            ViewFormat::Json => serde_json::to_string_pretty(&self.data)
                .unwrap_or_else(|_| "{}".to_string()),
        }
    }
}

/// Context passed to views for rendering.
pub struct RenderContext<'a> {
    /// Pre-computed comparison for the compare view.
    pub comparison: Option<&'a VersionComparison>,
    pub layout: DiffLayout,
    /// Total text width for column layouts.
    pub width: usize,
}

impl<'a> RenderContext<'a> {
    /// Create an empty render context.
    pub fn empty() -> Self {
        Self {
            comparison: None,
            layout: DiffLayout::default(),
            width: 100,
        }
    }
}

/// Trait for all spec views.
pub trait View {
    /// Render this view for the given spec and context.
    fn render(&self, spec: &Spec, ctx: &RenderContext<'_>) -> Result<ViewOutput, ObserveError>;

    /// The kind of view this is.
    fn kind(&self) -> ViewKind;
}

/// List all available view kinds.
pub fn available_views() -> &'static [ViewKind] {
    &[
        ViewKind::Summary,
        ViewKind::Stories,
        ViewKind::History,
        ViewKind::Approvals,
        ViewKind::Compare,
        ViewKind::Journal,
    ]
}

/// The view implementation for a kind.
pub fn view_for(kind: ViewKind) -> Box<dyn View> {
    match kind {
        ViewKind::Summary => Box::new(crate::summary::SummaryView),
        ViewKind::Stories => Box::new(crate::stories::StoriesView),
        ViewKind::History => Box::new(crate::history::HistoryView),
        ViewKind::Approvals => Box::new(crate::approvals::ApprovalsView),
        ViewKind::Compare => Box::new(crate::compare::CompareView),
        ViewKind::Journal => Box::new(crate::journal::JournalView),
    }
}
