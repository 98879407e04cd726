/// Visual Telephone — Kernel Errors
///
/// Every rejection the kernel can produce. None of them are fatal:
/// the engine state is left untouched when one is returned.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Identifier is not one of the student groups (includes the teacher).
    #[error("invalid participant {0:?}: expected one of GROUP_1..GROUP_5")]
    InvalidParticipant(String),

    #[error("unknown project {0:?}")]
    UnknownProject(String),

    /// Compare-and-append failed: the slot was already taken or is not yet open.
    #[error(
        "stale submission to {project_id}: expected round {expected_round}, \
         project has {actual_turns} turn(s)"
    )]
    StaleSubmission {
        project_id: String,
        expected_round: usize,
        actual_turns: usize,
    },

    #[error("prompt must not be empty")]
    EmptyPrompt,

    #[error("schema version mismatch: expected {expected}, got {got}")]
    SchemaVersion { expected: u32, got: u32 },

    #[error("sequence violation: expected {expected}, got {got}")]
    SequenceViolation { expected: u64, got: u64 },

    #[error("invariant violation: [INVARIANT:{name}] {detail}")]
    InvariantViolation { name: &'static str, detail: String },
}

impl EngineError {
    pub(crate) fn invariant(name: &'static str, detail: impl Into<String>) -> Self {
        EngineError::InvariantViolation {
            name,
            detail: detail.into(),
        }
    }
}
