//! Locating comment anchors in requirement text.

use serde::{Deserialize, Serialize};

/// Where an annotated span sits in a piece of text. Offsets are bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextAnchor {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

/// Text a comment can be anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorTarget<'a> {
    /// The working description.
    Description,
    /// A working story's description.
    Story(&'a str),
}

/// First occurrence of `span` in `text`.
///
/// Empty or whitespace-only spans never anchor.
pub fn find_anchor(text: &str, span: &str) -> Option<TextAnchor> {
    if span.trim().is_empty() {
        return None;
    }
    text.find(span).map(|start| TextAnchor {
        start,
        end: start + span.len(),
        text: span.to_string(),
    })
}
