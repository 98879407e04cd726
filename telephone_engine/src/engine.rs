/// Visual Telephone — Engine
///
/// Top-level orchestrator. Delegates mutation to transitions,
/// validates via invariants. Owns the one authoritative GameState.
///
/// Strict sequence enforcement. A rejected event leaves the engine as it was.

use tracing::{debug, info};

use crate::domain::{GameState, Participant, TransitionResult};
use crate::error::EngineError;
use crate::events::{EventEnvelope, SCHEMA_VERSION};
use crate::invariants::validate_invariants;
use crate::resolver::{route, Route};
use crate::state::create_initial_state;
use crate::transitions::apply_event as transition_apply;

/// Stateful engine wrapping the pure functional transition layer.
#[derive(Debug, Clone)]
pub struct TelephoneEngine {
    state: GameState,
    last_sequence: u64,
}

impl Default for TelephoneEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TelephoneEngine {
    /// Create an engine holding a fresh game.
    pub fn new() -> Self {
        Self {
            state: create_initial_state(),
            last_sequence: 0,
        }
    }

    /// Resume from a previously validated state at `last_sequence`.
    pub fn from_state(state: GameState, last_sequence: u64) -> Result<Self, EngineError> {
        validate_invariants(&state)?;
        Ok(Self {
            state,
            last_sequence,
        })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn last_sequence(&self) -> u64 {
        self.last_sequence
    }

    /// Sequence number the next event must carry.
    pub fn next_sequence(&self) -> u64 {
        self.last_sequence + 1
    }

    /// Where `participant` should be right now.
    pub fn route(&self, participant: Participant) -> Result<Route<'_>, EngineError> {
        route(participant, &self.state)
    }

    /// Apply a single event:
    ///   1. Validate schema version
    ///   2. Validate sequence (strictly increasing, no gaps)
    ///   3. Delegate to transitions::apply_event
    ///   4. Validate invariants on new state
    ///   5. Store and return
    pub fn apply_event(
        &mut self,
        event: &EventEnvelope,
    ) -> Result<(&GameState, TransitionResult), EngineError> {
        if event.schema_version != SCHEMA_VERSION {
            return Err(EngineError::SchemaVersion {
                expected: SCHEMA_VERSION,
                got: event.schema_version,
            });
        }

        let expected = self.next_sequence();
        if event.sequence != expected {
            return Err(EngineError::SequenceViolation {
                expected,
                got: event.sequence,
            });
        }

        let (new_state, result) = transition_apply(&self.state, event)?;
        validate_invariants(&new_state)?;

        self.state = new_state;
        self.last_sequence = event.sequence;

        if result.game_completed {
            info!(sequence = event.sequence, "all projects complete");
        } else {
            debug!(
                sequence = event.sequence,
                event_type = %result.event_type,
                "event applied"
            );
        }

        Ok((&self.state, result))
    }

    /// Apply an ordered sequence of events, stopping at the first rejection.
    pub fn apply_sequence(&mut self, events: &[EventEnvelope]) -> Result<&GameState, EngineError> {
        for event in events {
            self.apply_event(event)?;
        }
        Ok(&self.state)
    }

    /// Event-sourced reconstruction: reset and replay.
    pub fn replay(&mut self, events: &[EventEnvelope]) -> Result<&GameState, EngineError> {
        *self = Self::new();
        self.apply_sequence(events)
    }
}
