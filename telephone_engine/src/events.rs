/// Visual Telephone — Event Definitions
///
/// Events are pure data. They carry intent and payload only.
/// They contain ZERO transition logic.
///
/// Events with schema_version != SCHEMA_VERSION are rejected by the engine.

use serde::{Deserialize, Serialize};

use crate::domain::Turn;

/// Schema version for kernel events.
pub const SCHEMA_VERSION: u32 = 1;

/// The two ways a game can change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event_type", content = "payload", rename_all = "snake_case")]
pub enum GameEvent {
    /// Compare-and-append: accepted only if the project holds exactly
    /// `expected_round - 1` turns and the author is active on it.
    SubmitTurn {
        project_id: String,
        expected_round: usize,
        turn: Turn,
    },
    /// Operator reset. Discards every turn.
    Reset,
}

impl GameEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            GameEvent::SubmitTurn { .. } => "submit_turn",
            GameEvent::Reset => "reset",
        }
    }
}

/// Sequenced event envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub sequence: u64,
    pub logical_time: u64,
    pub schema_version: u32,
    #[serde(flatten)]
    pub event: GameEvent,
}

impl EventEnvelope {
    /// Wrap an event at the given sequence. Logical time tracks the sequence.
    pub fn new(sequence: u64, event: GameEvent) -> Self {
        Self {
            sequence,
            logical_time: sequence,
            schema_version: SCHEMA_VERSION,
            event,
        }
    }

    pub fn event_type(&self) -> &'static str {
        self.event.event_type()
    }
}
