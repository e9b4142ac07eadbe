//! Error types for the lifecycle engine.
//!
//! Every variant is a rejected command or a rejected load. None of them is
//! fatal, and a command that returns one has left the spec unchanged.

/// Errors from lifecycle commands, lookups, and spec file loading.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LifecycleError {
    #[error("requirements are locked: {reason}")]
    Locked { reason: String },

    #[error("approver '{0}' is not assigned to this spec")]
    UnknownApprover(String),

    #[error("version '{0}' not found in history")]
    UnknownVersion(String),

    #[error("'{0}' is not a stage (expected requirements, technical-design, or implementation-tasks)")]
    InvalidStageTransition(String),

    #[error("user story '{0}' not found")]
    UnknownStory(String),

    #[error("user story '{0}' already exists")]
    DuplicateStory(String),

    #[error("approver '{0}' already exists")]
    DuplicateApprover(String),

    #[error("invalid story order: {0}")]
    InvalidReorder(String),

    #[error("requirements are not locked")]
    NotLocked,

    #[error("estimate for story '{id}' must be a non-negative number, got {value}")]
    InvalidEstimate { id: String, value: f64 },

    #[error("invalid version label '{0}' (expected vMAJOR.MINOR)")]
    InvalidLabel(String),

    #[error("version label {0} cannot be bumped any further")]
    LabelExhausted(String),

    #[error("unknown spec status '{0}' (expected draft, review, approved, or implemented)")]
    UnknownStatus(String),

    #[error("unknown story status '{0}' (expected todo, in-progress, or done)")]
    UnknownStoryStatus(String),

    #[error("corrupt spec history: {0}")]
    CorruptHistory(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("invalid spec file magic bytes")]
    InvalidMagic,

    #[error("unsupported spec file version {major}.{minor}")]
    UnsupportedVersion { major: u8, minor: u8 },

    #[error("integrity check failed: expected {expected}, got {actual}")]
    IntegrityFailed { expected: String, actual: String },

    #[error("spec file too short: need at least {expected} bytes, got {actual}")]
    TooShort { expected: usize, actual: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = LifecycleError::Locked {
            reason: "Requirements locked because spec moved to technical design stage".into(),
        };
        assert!(err.to_string().starts_with("requirements are locked"));

        let err = LifecycleError::UnknownVersion("v9.9".into());
        assert!(err.to_string().contains("v9.9"));
    }

    #[test]
    fn stage_error_names_the_input() {
        let err = LifecycleError::InvalidStageTransition("shipping".into());
        assert!(err.to_string().contains("'shipping'"));
    }
}
