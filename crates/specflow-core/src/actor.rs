//! Actor references.
//!
//! Authentication and identity live outside Specflow. Every actor-bearing
//! field (version creator, approver, story assignee, comment author) holds an
//! opaque [`ActorRef`] handed in by the host; the engine never resolves or
//! validates it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An opaque reference to a person or system acting on a spec.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorRef {
    /// Host-assigned identifier.
    pub id: String,
    /// Name shown in views.
    pub display_name: String,
    /// Avatar location, if the host has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_ref: Option<String>,
}

impl ActorRef {
    /// Create an actor reference without an avatar.
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            avatar_ref: None,
        }
    }

    /// Builder: set the avatar reference.
    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar_ref = Some(avatar.into());
        self
    }

    /// Up to two uppercase initials derived from the display name.
    ///
    /// Falls back to the first character of the id when the display name
    /// has no alphanumeric words.
    pub fn initials(&self) -> String {
        let initials: String = self
            .display_name
            .split_whitespace()
            .filter_map(|word| word.chars().find(|c| c.is_alphanumeric()))
            .take(2)
            .flat_map(char::to_uppercase)
            .collect();
        if initials.is_empty() {
            self.id.chars().take(1).flat_map(char::to_uppercase).collect()
        } else {
            initials
        }
    }
}

impl fmt::Display for ActorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.display_name, self.id)
    }
}
