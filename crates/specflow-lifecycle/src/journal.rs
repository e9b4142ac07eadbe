//! Append-only record of the commands applied to a spec.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use specflow_core::{ActorRef, Timestamp};

use crate::approval::ApprovalStatus;
use crate::error::LifecycleError;
use crate::spec::SpecStatus;
use crate::stage::Stage;
use crate::story::StoryField;
use crate::version::VersionLabel;

/// What happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum EventKind {
    Created,
    StageChanged {
        from: Stage,
        to: Stage,
    },
    Locked {
        reason: String,
    },
    Unlocked,
    StatusChanged {
        from: SpecStatus,
        to: SpecStatus,
    },
    DescriptionEdited,
    StoryAdded {
        id: String,
    },
    StoryUpdated {
        id: String,
        fields: Vec<StoryField>,
    },
    StoryRemoved {
        id: String,
    },
    StoriesReordered,
    SnapshotCreated {
        label: VersionLabel,
        changes: usize,
    },
    ApproverAdded {
        id: String,
    },
    DecisionRecorded {
        approver: String,
        status: ApprovalStatus,
    },
    AssigneeChanged {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        assignee: Option<String>,
    },
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Created => write!(f, "created"),
            EventKind::StageChanged { from, to } => write!(f, "stage {from} -> {to}"),
            EventKind::Locked { reason } => write!(f, "locked: {reason}"),
            EventKind::Unlocked => write!(f, "unlocked"),
            EventKind::StatusChanged { from, to } => write!(f, "status {from} -> {to}"),
            EventKind::DescriptionEdited => write!(f, "description edited"),
            EventKind::StoryAdded { id } => write!(f, "story {id} added"),
            EventKind::StoryUpdated { id, fields } => {
                let names: Vec<&str> = fields.iter().map(|f| f.label()).collect();
                write!(f, "story {id} updated ({})", names.join(", "))
            }
            EventKind::StoryRemoved { id } => write!(f, "story {id} removed"),
            EventKind::StoriesReordered => write!(f, "stories reordered"),
            EventKind::SnapshotCreated { label, changes } => {
                write!(f, "snapshot {label} ({changes} changes)")
            }
            EventKind::ApproverAdded { id } => write!(f, "approver {id} added"),
            EventKind::DecisionRecorded { approver, status } => {
                write!(f, "approver {approver} {status}")
            }
            EventKind::AssigneeChanged { assignee: Some(id) } => write!(f, "assigned to {id}"),
            EventKind::AssigneeChanged { assignee: None } => write!(f, "unassigned"),
        }
    }
}

/// One journal entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifecycleEvent {
    pub id: Uuid,
    /// Starts at 1 and increases by one per event.
    pub sequence: u64,
    pub timestamp: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<ActorRef>,
    #[serde(flatten)]
    pub kind: EventKind,
}

/// Ordered event log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Journal {
    events: Vec<LifecycleEvent>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[LifecycleEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn last(&self) -> Option<&LifecycleEvent> {
        self.events.last()
    }

    /// Append an event with the next sequence number.
    pub fn record(
        &mut self,
        kind: EventKind,
        actor: Option<ActorRef>,
        timestamp: Timestamp,
    ) -> &LifecycleEvent {
        let sequence = self.events.last().map_or(1, |e| e.sequence + 1);
        self.events.push(LifecycleEvent {
            id: Uuid::new_v4(),
            sequence,
            timestamp,
            actor,
            kind,
        });
        &self.events[self.events.len() - 1]
    }

    /// Events matching a predicate, oldest first.
    pub fn filter<'a, P>(&'a self, mut predicate: P) -> impl Iterator<Item = &'a LifecycleEvent>
    where
        P: FnMut(&EventKind) -> bool + 'a,
    {
        self.events.iter().filter(move |e| predicate(&e.kind))
    }

    /// Check that sequence numbers run 1, 2, 3, ...
    pub fn validate(&self) -> Result<(), LifecycleError> {
        for (i, event) in self.events.iter().enumerate() {
            let expected = i as u64 + 1;
            if event.sequence != expected {
                return Err(LifecycleError::CorruptHistory(format!(
                    "journal event {} has sequence {}, expected {expected}",
                    event.id, event.sequence
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn sequences_increase_from_one() {
        let mut journal = Journal::new();
        let at = Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap();
        journal.record(EventKind::Created, None, at);
        journal.record(EventKind::DescriptionEdited, None, at);
        let last = journal.record(EventKind::Unlocked, None, at);
        assert_eq!(last.sequence, 3);
        assert!(journal.validate().is_ok());
        let ids: std::collections::HashSet<_> = journal.events().iter().map(|e| e.id).collect();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn validate_rejects_gaps() {
        let mut journal = Journal::new();
        let at = Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap();
        journal.record(EventKind::Created, None, at);
        journal.record(EventKind::Unlocked, None, at);
        journal.events[1].sequence = 5;
        assert!(matches!(journal.validate(), Err(LifecycleError::CorruptHistory(_))));
    }

    #[test]
    fn event_serializes_flat() {
        let mut journal = Journal::new();
        let at = Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap();
        journal.record(
            EventKind::StageChanged {
                from: Stage::Requirements,
                to: Stage::TechnicalDesign,
            },
            Some(ActorRef::new("u1", "Alice Johnson")),
            at,
        );
        let json = serde_json::to_value(&journal).unwrap();
        assert_eq!(json[0]["event"], "stage-changed");
        assert_eq!(json[0]["to"], "technical-design");
        assert_eq!(json[0]["sequence"], 1);
        let back: Journal = serde_json::from_value(json).unwrap();
        assert_eq!(back, journal);
    }

    #[test]
    fn display_is_readable() {
        let kind = EventKind::StoryUpdated {
            id: "US-002".into(),
            fields: vec![StoryField::Title, StoryField::AcceptanceCriteria],
        };
        assert_eq!(kind.to_string(), "story US-002 updated (title, acceptance criteria)");
    }
}
