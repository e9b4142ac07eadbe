//! Stage and requirement-lock state machine.
//!
//! A spec sits in one of three pipeline stages and may move between them in
//! either direction. Moving into a downstream stage locks the requirements;
//! nothing but an explicit unlock releases them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LifecycleError;

/// The pipeline stage a spec occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    #[default]
    Requirements,
    TechnicalDesign,
    ImplementationTasks,
}

impl Stage {
    /// Stages in pipeline order.
    pub const ALL: [Stage; 3] = [
        Stage::Requirements,
        Stage::TechnicalDesign,
        Stage::ImplementationTasks,
    ];

    /// Wire name, e.g. `technical-design`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Requirements => "requirements",
            Stage::TechnicalDesign => "technical-design",
            Stage::ImplementationTasks => "implementation-tasks",
        }
    }

    /// Lowercase prose name, e.g. `technical design`.
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Requirements => "requirements",
            Stage::TechnicalDesign => "technical design",
            Stage::ImplementationTasks => "implementation tasks",
        }
    }

    /// Whether entering this stage from elsewhere locks the requirements.
    pub fn locks_requirements(&self) -> bool {
        match self {
            Stage::Requirements => false,
            Stage::TechnicalDesign | Stage::ImplementationTasks => true,
        }
    }

    /// Parse a stage name. Case, underscores, and spaces are tolerated.
    pub fn parse(s: &str) -> Result<Self, LifecycleError> {
        match s.trim().to_ascii_lowercase().replace(['_', ' '], "-").as_str() {
            "requirements" => Ok(Stage::Requirements),
            "technical-design" => Ok(Stage::TechnicalDesign),
            "implementation-tasks" => Ok(Stage::ImplementationTasks),
            _ => Err(LifecycleError::InvalidStageTransition(s.to_string())),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = LifecycleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::parse(s)
    }
}

/// Whether requirement content may be edited.
///
/// A reason is carried exactly when the requirements are locked.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum LockState {
    #[default]
    Unlocked,
    Locked { reason: String },
}

impl LockState {
    pub fn is_locked(&self) -> bool {
        matches!(self, LockState::Locked { .. })
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            LockState::Unlocked => None,
            LockState::Locked { reason } => Some(reason),
        }
    }

    /// Fail with [`LifecycleError::Locked`] if content edits are blocked.
    pub fn ensure_unlocked(&self) -> Result<(), LifecycleError> {
        match self {
            LockState::Unlocked => Ok(()),
            LockState::Locked { reason } => Err(LifecycleError::Locked {
                reason: reason.clone(),
            }),
        }
    }
}

/// Reason recorded when a move into `stage` locks the requirements.
pub fn lock_reason(stage: Stage) -> String {
    format!(
        "Requirements locked because spec moved to {} stage",
        stage.label()
    )
}

/// A change to the lock produced by a transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "change", rename_all = "lowercase")]
pub enum LockChange {
    Locked { reason: String },
    Unlocked,
}

/// The outcome of a stage command, computed before anything is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageTransition {
    pub from: Stage,
    pub to: Stage,
    /// Lock state after the transition.
    pub lock: LockState,
    /// Present when the lock state changes.
    pub lock_change: Option<LockChange>,
}

impl StageTransition {
    /// True when the command re-enters the current stage.
    pub fn is_noop(&self) -> bool {
        self.from == self.to
    }
}

/// Plan a move from `current` to `target`.
///
/// Entering a downstream stage from a different stage locks with a reason
/// naming the target. Re-entering the current stage, or entering
/// `requirements`, leaves the lock as it is.
pub fn plan_stage_change(current: Stage, lock: &LockState, target: Stage) -> StageTransition {
    let next_lock = if target != current && target.locks_requirements() {
        LockState::Locked {
            reason: lock_reason(target),
        }
    } else {
        lock.clone()
    };

    let lock_change = match (&next_lock, next_lock != *lock) {
        (LockState::Locked { reason }, true) => Some(LockChange::Locked {
            reason: reason.clone(),
        }),
        (LockState::Unlocked, true) => Some(LockChange::Unlocked),
        (_, false) => None,
    };

    StageTransition {
        from: current,
        to: target,
        lock: next_lock,
        lock_change,
    }
}

/// Plan an explicit unlock. Only valid while locked.
pub fn plan_unlock(lock: &LockState) -> Result<LockChange, LifecycleError> {
    if lock.is_locked() {
        Ok(LockChange::Unlocked)
    } else {
        Err(LifecycleError::NotLocked)
    }
}
